//! Editor controller.
//!
//! Wires UI intents to the layer store, keeps the selection consistent with
//! the store, derives the canvas size, and owns the one piece of transient
//! view state: the drag gesture in flight.

use crate::input::InputEvent;
use itc_core::fonts::{FontError, FontKey, FontRegistry, UploadedFont};
use itc_core::id::LayerId;
use itc_core::image::{ImageDimensions, ImageSlot, LoadTicket};
use itc_core::model::{DEFAULT_FONT_FAMILY, LayerPatch, Position, TextLayer};
use itc_core::{CanvasSize, ComposerConfig, LayerStore};
use itc_render::{DragOverride, Scene, TextMeasure, hit_test};

/// Degrees added or removed by one rotate button press.
pub const ROTATION_STEP: f32 = 15.0;

/// A drag in progress. The store is untouched until pointer up.
#[derive(Debug, Clone, Copy)]
struct DragGesture {
    id: LayerId,
    /// Pointer position minus layer origin at pointer down.
    grab: (f32, f32),
    /// Transient position; `None` until the pointer actually moves.
    position: Option<Position>,
}

pub struct Editor<I> {
    config: ComposerConfig,
    store: LayerStore,
    selected: Option<LayerId>,
    drag: Option<DragGesture>,
    container_width: f32,
    canvas: CanvasSize,
    image: ImageSlot<I>,
    fonts: FontRegistry,
}

impl<I: ImageDimensions> Default for Editor<I> {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl<I: ImageDimensions> Editor<I> {
    pub fn new(config: ComposerConfig) -> Self {
        let canvas = config.default_canvas;
        let fonts = config.font_registry();
        Self {
            config,
            store: LayerStore::new(),
            selected: None,
            drag: None,
            container_width: canvas.width,
            canvas,
            image: ImageSlot::new(),
            fonts,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn image(&self) -> Option<&I> {
        self.image.get()
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    /// Append a default layer and select it.
    pub fn add_text(&mut self) -> LayerId {
        let id = self.store.add(self.canvas);
        self.selected = Some(id);
        log::debug!("editor: added {id}, now selected");
        id
    }

    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        self.store.update(id, patch)
    }

    /// Remove a layer. Clears the selection only if it pointed at `id`, and
    /// cancels a drag of that layer.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        if !self.store.remove(id) {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag.is_some_and(|d| d.id == id) {
            log::debug!("editor: drag of {id} cancelled by removal");
            self.drag = None;
        }
        true
    }

    pub fn move_forward(&mut self, id: LayerId) -> bool {
        self.store.move_forward(id)
    }

    pub fn move_backward(&mut self, id: LayerId) -> bool {
        self.store.move_backward(id)
    }

    pub fn rotate_by(&mut self, id: LayerId, delta: f32) -> bool {
        let Some(layer) = self.store.get(id) else {
            return false;
        };
        let rotation = layer.rotation + delta;
        self.store.update(id, &LayerPatch::rotation(rotation))
    }

    pub fn reset_rotation(&mut self, id: LayerId) -> bool {
        self.store.update(id, &LayerPatch::rotation(0.0))
    }

    /// First line of the layer's text, or a placeholder when blank.
    pub fn layer_title(&self, id: LayerId) -> Option<&str> {
        self.store.get(id).map(TextLayer::title)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`, or clear with `None`. Unknown ids are refused.
    pub fn select(&mut self, id: Option<LayerId>) -> bool {
        match id {
            Some(id) if !self.store.contains(id) => false,
            other => {
                self.selected = other;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&TextLayer> {
        self.selected.and_then(|id| self.store.get(id))
    }

    // ─── Canvas and image ────────────────────────────────────────────────

    /// The container was measured (initially or after a window resize).
    pub fn resize_container(&mut self, width: f32) {
        self.container_width = width;
        self.refresh_canvas();
    }

    /// Start loading a file of `media_type`. `None` means the file was
    /// rejected (or the input cleared) and the image is already gone.
    pub fn begin_image_load(&mut self, media_type: Option<&str>) -> Option<LoadTicket> {
        let ticket = self.image.begin(media_type);
        if ticket.is_none() {
            self.refresh_canvas();
        }
        ticket
    }

    /// Deliver a decoded image (or `None` on decode failure). Returns false
    /// when the load was superseded and its result dropped.
    pub fn finish_image_load(&mut self, ticket: LoadTicket, image: Option<I>) -> bool {
        if !self.image.finish(ticket, image) {
            return false;
        }
        self.refresh_canvas();
        true
    }

    fn refresh_canvas(&mut self) {
        self.canvas = CanvasSize::derive(self.container_width, self.image.dimensions());
        log::trace!(
            "editor: canvas {}x{}",
            self.canvas.width,
            self.canvas.height
        );
    }

    // ─── Fonts ───────────────────────────────────────────────────────────

    /// Assign `family` to a layer. The change is applied immediately; a
    /// returned key means the family still has to be fetched, and the
    /// caller reports back through `font_loaded`.
    pub fn choose_font(&mut self, id: LayerId, family: &str) -> Option<FontKey> {
        if !self.store.update(id, &LayerPatch::font_family(family)) {
            return None;
        }
        self.fonts.begin_load(family)
    }

    pub fn font_loaded(&mut self, key: &FontKey, result: Result<(), FontError>) {
        self.fonts.finish_load(key, result);
    }

    /// Record an upload whose face has been installed by the backend.
    pub fn accept_uploaded_font(&mut self, font: &UploadedFont) {
        self.fonts.record_uploaded(&font.family);
    }

    /// Font choices for a layer, its current family first.
    pub fn available_fonts(&self, id: LayerId) -> Vec<String> {
        let current = self
            .store
            .get(id)
            .map_or(DEFAULT_FONT_FAMILY, |layer| layer.font_family.as_str());
        self.fonts.list_available(current)
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    /// Feed a pointer event. Returns true when the view must be redrawn.
    ///
    /// `measure` lays text out for hit testing; pass the one the view is
    /// drawn with so clicks land on the lines as shown.
    pub fn handle_input(&mut self, event: &InputEvent, measure: &mut dyn TextMeasure) -> bool {
        let (x, y) = event.position();
        match event {
            InputEvent::PointerDown { .. } => self.pointer_down(x, y, measure),
            InputEvent::PointerMove { .. } => self.pointer_move(x, y),
            InputEvent::PointerUp { .. } => self.pointer_up(x, y),
        }
    }

    fn pointer_down(&mut self, x: f32, y: f32, measure: &mut dyn TextMeasure) -> bool {
        // A press without a release in between: keep where the layer was
        // dragged to.
        let recovered = match self.drag.take() {
            Some(DragGesture {
                id,
                position: Some(position),
                ..
            }) => {
                log::debug!(
                    "editor: drag of {id} lost its release, keeping ({}, {})",
                    position.x,
                    position.y
                );
                self.store.update(id, &LayerPatch::position(position))
            }
            _ => false,
        };

        let hit = hit_test(&self.scene(measure), x, y);
        let changed = recovered || self.selected != hit;
        self.selected = hit;
        self.drag = hit.and_then(|id| self.store.get(id)).map(|layer| DragGesture {
            id: layer.id,
            grab: (x - layer.position.x, y - layer.position.y),
            position: None,
        });
        changed
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.position = Some(Position::new(x - drag.grab.0, y - drag.grab.1));
        true
    }

    fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if drag.position.is_none() {
            return false;
        }
        let position = Position::new(x - drag.grab.0, y - drag.grab.1);
        log::debug!("editor: drag of {} ends at ({}, {})", drag.id, position.x, position.y);
        self.store.update(drag.id, &LayerPatch::position(position));
        true
    }

    /// Whether a drag gesture is in flight.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Laid-out scene for the current state, including transient drag
    /// feedback.
    pub fn scene(&self, measure: &mut dyn TextMeasure) -> Scene {
        let drag = self.drag.and_then(|d| {
            d.position.map(|position| DragOverride { id: d.id, position })
        });
        Scene::compose(
            &self.store.snapshot(),
            self.canvas,
            self.config.background,
            self.image.get().is_some(),
            drag.as_ref(),
        )
        .layout(measure)
    }
}
