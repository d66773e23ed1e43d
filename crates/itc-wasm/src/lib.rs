//! WASM bridge for the image text composer: exposes the editor to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Layers cross the boundary
//! as JSON; layer ids as strings.

mod fonts;
mod image;
mod render2d;

use image::WebImage;
use itc_core::id::LayerId;
use itc_core::model::LayerPatch;
use itc_core::{ComposerConfig, FontError};
use itc_editor::{Editor, InputEvent, ROTATION_STEP};
use itc_render::{FixedAdvance, paint_scene};
use js_sys::{Function, Promise};
use render2d::{CanvasMeasure, CanvasPainter};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{CanvasRenderingContext2d, File, HtmlCanvasElement};

type Shared = Rc<RefCell<Editor<WebImage>>>;

/// Redraw request fired after asynchronous work changed what is on screen.
#[derive(Clone, Default)]
struct ChangeHook(Rc<RefCell<Option<Function>>>);

impl ChangeHook {
    fn fire(&self) {
        if let Some(cb) = self.0.borrow().as_ref() {
            if let Err(e) = cb.call0(&JsValue::NULL) {
                log::warn!("on_change callback threw: {e:?}");
            }
        }
    }
}

/// The composer as seen from JavaScript.
///
/// Synchronous calls return whether the view must be redrawn; asynchronous
/// completions (image decode, font load) fire the `on_change` callback.
#[wasm_bindgen]
pub struct TextComposer {
    editor: Shared,
    on_change: ChangeHook,
    /// Context of the last render; pointer hits are laid out with its
    /// metrics.
    view: RefCell<Option<CanvasRenderingContext2d>>,
}

impl Default for TextComposer {
    fn default() -> Self {
        Self::with_config(ComposerConfig::default())
    }
}

impl TextComposer {
    fn with_config(config: ComposerConfig) -> Self {
        console_error_panic_hook_setup();
        Self {
            editor: Rc::new(RefCell::new(Editor::new(config))),
            on_change: ChangeHook::default(),
            view: RefCell::new(None),
        }
    }
}

/// Resolve an id coming from JS without interning unknown strings.
fn layer(id: &str) -> Option<LayerId> {
    LayerId::lookup(id)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl TextComposer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a JSON config document (missing fields take defaults).
    pub fn from_config(json: &str) -> Result<TextComposer, JsValue> {
        ComposerConfig::from_json(json)
            .map(Self::with_config)
            .map_err(js_err)
    }

    pub fn set_on_change(&self, callback: Option<Function>) {
        *self.on_change.0.borrow_mut() = callback;
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    /// Add a default layer, select it, and return its id.
    pub fn add_text(&self) -> String {
        self.editor.borrow_mut().add_text().as_str().to_string()
    }

    /// Apply a camelCase JSON patch, e.g. `{"text":"Hi","fontSize":48}`.
    pub fn update_layer(&self, id: &str, patch_json: &str) -> Result<bool, JsValue> {
        let patch: LayerPatch = serde_json::from_str(patch_json).map_err(js_err)?;
        Ok(layer(id).is_some_and(|id| self.editor.borrow_mut().update_layer(id, &patch)))
    }

    pub fn remove_layer(&self, id: &str) -> bool {
        layer(id).is_some_and(|id| self.editor.borrow_mut().remove_layer(id))
    }

    pub fn move_forward(&self, id: &str) -> bool {
        layer(id).is_some_and(|id| self.editor.borrow_mut().move_forward(id))
    }

    pub fn move_backward(&self, id: &str) -> bool {
        layer(id).is_some_and(|id| self.editor.borrow_mut().move_backward(id))
    }

    /// Rotate by one step; `clockwise = false` rotates the other way.
    pub fn rotate_step(&self, id: &str, clockwise: bool) -> bool {
        let delta = if clockwise { ROTATION_STEP } else { -ROTATION_STEP };
        layer(id).is_some_and(|id| self.editor.borrow_mut().rotate_by(id, delta))
    }

    pub fn reset_rotation(&self, id: &str) -> bool {
        layer(id).is_some_and(|id| self.editor.borrow_mut().reset_rotation(id))
    }

    pub fn layer_title(&self, id: &str) -> Option<String> {
        let editor = self.editor.borrow();
        layer(id).and_then(|id| editor.layer_title(id).map(str::to_string))
    }

    /// All layers in z-order as a JSON array.
    pub fn layers_json(&self) -> String {
        let layers = self.editor.borrow().store().snapshot();
        serde_json::to_string(&*layers).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&self, id: Option<String>) -> bool {
        let target = match id.as_deref() {
            Some(s) => match layer(s) {
                Some(id) => Some(id),
                None => return false,
            },
            None => None,
        };
        self.editor.borrow_mut().select(target)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.editor
            .borrow()
            .selected()
            .map(|id| id.as_str().to_string())
    }

    // ─── Fonts ───────────────────────────────────────────────────────────

    /// Font choices for a layer as a JSON array of family names.
    pub fn available_fonts_json(&self, id: &str) -> String {
        let editor = self.editor.borrow();
        let fonts = match layer(id) {
            Some(id) => editor.available_fonts(id),
            None => editor.fonts().list_available(itc_core::DEFAULT_FONT_FAMILY),
        };
        serde_json::to_string(&fonts).unwrap_or_else(|_| "[]".to_string())
    }

    /// Assign a family. Catalog families load in the background and fire
    /// `on_change` when ready; failures fall back silently.
    pub fn choose_font(&self, id: &str, family: &str) -> bool {
        let Some(id) = layer(id) else {
            return false;
        };
        let key = self.editor.borrow_mut().choose_font(id, family);
        if let Some(key) = key {
            let editor = self.editor.clone();
            let on_change = self.on_change.clone();
            spawn_local(async move {
                let result = fonts::load_catalog(&key).await;
                let ok = result.is_ok();
                editor.borrow_mut().font_loaded(&key, result);
                if ok {
                    on_change.fire();
                }
            });
        }
        true
    }

    /// Install an uploaded font file. Resolves with the family name, or
    /// rejects with a message fit to show the user.
    pub fn upload_font(&self, file: File) -> Promise {
        let editor = self.editor.clone();
        let on_change = self.on_change.clone();
        future_to_promise(async move {
            match fonts::install_upload(&file).await {
                Ok(font) => {
                    editor.borrow_mut().accept_uploaded_font(&font);
                    on_change.fire();
                    Ok(JsValue::from_str(&font.family))
                }
                Err(e) => {
                    if !matches!(e, FontError::UnsupportedFormat { .. }) {
                        log::warn!("fonts: {e}");
                    }
                    Err(js_err(e))
                }
            }
        })
    }

    // ─── Canvas and image ────────────────────────────────────────────────

    /// Container width changed (mount or window resize).
    pub fn resize(&self, container_width: f32) {
        self.editor.borrow_mut().resize_container(container_width);
    }

    pub fn canvas_width(&self) -> f32 {
        self.editor.borrow().canvas().width
    }

    pub fn canvas_height(&self) -> f32 {
        self.editor.borrow().canvas().height
    }

    /// Load the chosen file, or clear with `None`. Anything but PNG clears
    /// the image. A load superseded by a newer one is discarded.
    pub fn load_image(&self, file: Option<File>) {
        let media_type = file.as_ref().map(|f| f.type_());
        let ticket = self
            .editor
            .borrow_mut()
            .begin_image_load(media_type.as_deref());
        let (Some(file), Some(ticket)) = (file, ticket) else {
            self.on_change.fire();
            return;
        };

        let editor = self.editor.clone();
        let on_change = self.on_change.clone();
        spawn_local(async move {
            let decoded = match image::decode(&file).await {
                Ok(img) => Some(img),
                Err(e) => {
                    log::warn!("image: decode of {:?} failed: {e:?}", file.name());
                    None
                }
            };
            if editor.borrow_mut().finish_image_load(ticket, decoded) {
                on_change.fire();
            }
        });
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&self, x: f32, y: f32) -> bool {
        self.handle(InputEvent::PointerDown { x, y })
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> bool {
        self.handle(InputEvent::PointerMove { x, y })
    }

    pub fn pointer_up(&self, x: f32, y: f32) -> bool {
        self.handle(InputEvent::PointerUp { x, y })
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Draw the current composition.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let editor = self.editor.borrow();
        let scene = editor.scene(&mut CanvasMeasure::new(ctx));
        paint_scene(&scene, &mut CanvasPainter::new(ctx), editor.image());
        *self.view.borrow_mut() = Some(ctx.clone());
    }

    /// Render at canvas size into `canvas` and return a PNG data URL.
    pub fn export_png(&self, canvas: &HtmlCanvasElement) -> Result<String, JsValue> {
        let (width, height) = self.editor.borrow().canvas().pixel_dimensions();
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        self.render(&ctx);
        canvas.to_data_url_with_type("image/png")
    }

    /// Suggested download name for exports.
    pub fn export_file_name(&self) -> String {
        self.editor.borrow().config().export_file_name.clone()
    }
}

impl TextComposer {
    fn handle(&self, event: InputEvent) -> bool {
        let mut editor = self.editor.borrow_mut();
        match self.view.borrow().as_ref() {
            Some(ctx) => editor.handle_input(&event, &mut CanvasMeasure::new(ctx)),
            None => editor.handle_input(&event, &mut FixedAdvance::default()),
        }
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("ITC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
