//! Headless composition session.
//!
//! The editor plus a native font book: images are decoded with the `image`
//! crate, fonts are installed into cosmic-text, and exports go through the
//! raster painter. Used by tests and by anything compositing off-browser.

use crate::catalog::CatalogClient;
use crate::editor::Editor;
use crate::input::InputEvent;
use itc_core::fonts::{FontError, FontKey, UploadedFont};
use itc_core::id::LayerId;
use itc_core::image::ImageError;
use itc_core::ComposerConfig;
use itc_render::{Bitmap, ExportError, FontBook, decode_png, export_png};

pub struct Session {
    pub editor: Editor<Bitmap>,
    pub fonts: FontBook,
}

impl Default for Session {
    /// Platform fonts, with the catalog key taken from the environment.
    fn default() -> Self {
        Self::new(ComposerConfig::from_env())
    }
}

/// WOFF and WOFF2 wrap their tables in a compressed container the native
/// font stack cannot read; browsers unpack them on their own.
fn is_compressed_web_font(file_name: &str, media_type: &str, bytes: &[u8]) -> bool {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    matches!(ext.as_deref(), Some("woff" | "woff2"))
        || media_type.to_ascii_lowercase().contains("woff")
        || bytes.starts_with(b"wOFF")
        || bytes.starts_with(b"wOF2")
}

impl Session {
    /// Session using the platform's installed fonts.
    pub fn new(config: ComposerConfig) -> Self {
        Self::with_fonts(config, FontBook::new())
    }

    pub fn with_fonts(config: ComposerConfig, fonts: FontBook) -> Self {
        Self {
            editor: Editor::new(config),
            fonts,
        }
    }

    /// Load an image file. Non-PNG types clear the image; a PNG that fails
    /// to decode clears it too and reports why.
    pub fn load_image(&mut self, media_type: &str, bytes: &[u8]) -> Result<bool, ImageError> {
        let Some(ticket) = self.editor.begin_image_load(Some(media_type)) else {
            return Ok(false);
        };
        match decode_png(bytes) {
            Ok(bitmap) => Ok(self.editor.finish_image_load(ticket, Some(bitmap))),
            Err(e) => {
                self.editor.finish_image_load(ticket, None);
                Err(e)
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.editor.begin_image_load(None);
    }

    /// Feed a pointer event, hit testing against text laid out with the
    /// session's fonts.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.editor.handle_input(event, &mut self.fonts)
    }

    /// Validate, install and register an uploaded font file. On success the
    /// family heads the font list.
    ///
    /// Only TrueType and OpenType data installs here; WOFF and WOFF2 files
    /// are refused with the unsupported-format message.
    pub fn install_font(
        &mut self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFont, FontError> {
        let font = UploadedFont::from_file(file_name, media_type)?;
        if is_compressed_web_font(file_name, media_type, &bytes) {
            log::debug!("fonts: {file_name:?} is a compressed web font, refusing");
            return Err(FontError::UnsupportedFormat {
                file_name: file_name.to_string(),
            });
        }
        self.fonts.install(&font.family, bytes)?;
        self.editor.accept_uploaded_font(&font);
        Ok(font)
    }

    /// Assign a family; returns the catalog fetch still to run, if any.
    pub fn choose_font(&mut self, id: LayerId, family: &str) -> Option<FontKey> {
        self.editor.choose_font(id, family)
    }

    /// Fetch and install a catalog family. Failures are logged and leave
    /// the layer on the fallback face.
    pub async fn load_catalog_font(&mut self, key: FontKey, client: &CatalogClient) {
        let result = match client.fetch_face(&key.family).await {
            Ok(bytes) => self.fonts.install(&key.family, bytes),
            Err(e) => Err(FontError::Catalog {
                family: key.family.clone(),
                reason: e.to_string(),
            }),
        };
        self.editor.font_loaded(&key, result);
    }

    /// Replace the catalog listing with the full catalog when a key is set.
    pub async fn refresh_catalog(&mut self, client: &CatalogClient) {
        let Some(api_key) = self.editor.config().catalog_api_key.clone() else {
            return;
        };
        match client.list_families(&api_key).await {
            Ok(families) => self.editor.fonts_mut().set_catalog(families),
            Err(e) => log::warn!("catalog: listing failed, keeping built-in fonts: {e}"),
        }
    }

    /// Rasterize the current composition at canvas size.
    pub fn export_png(&mut self) -> Result<Vec<u8>, ExportError> {
        let scene = self.editor.scene(&mut self.fonts);
        export_png(&scene, self.editor.image(), &mut self.fonts)
    }
}
