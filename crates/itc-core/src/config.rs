//! Composer configuration.
//!
//! Everything has a default; the only environment input is the optional
//! font-catalog access key.

use crate::canvas::CanvasSize;
use crate::fonts::{CATALOG_FONTS, FontRegistry, LOCAL_FONTS};
use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Environment variable holding the web-font catalog access key.
pub const CATALOG_KEY_ENV: &str = "ITC_FONT_CATALOG_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Enables listing the full catalog instead of the built-in selection.
    pub catalog_api_key: Option<String>,
    pub local_fonts: Vec<String>,
    pub catalog_fonts: Vec<String>,
    /// Solid fill behind the image.
    pub background: Color,
    /// Canvas size before the container is measured.
    pub default_canvas: CanvasSize,
    pub export_file_name: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            catalog_api_key: None,
            local_fonts: LOCAL_FONTS.iter().map(|s| s.to_string()).collect(),
            catalog_fonts: CATALOG_FONTS.iter().map(|s| s.to_string()).collect(),
            background: Color::from_rgba8(0xf7, 0xf7, 0xf7, 0xff),
            default_canvas: CanvasSize::default(),
            export_file_name: "export.png".to_string(),
        }
    }
}

impl ComposerConfig {
    /// Defaults plus the catalog key from the environment, if set.
    pub fn from_env() -> Self {
        Self::default().with_catalog_key(std::env::var(CATALOG_KEY_ENV).ok())
    }

    /// Parse a JSON config document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_catalog_key(mut self, key: Option<String>) -> Self {
        self.catalog_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn font_registry(&self) -> FontRegistry {
        FontRegistry::new(self.local_fonts.clone(), self.catalog_fonts.clone())
    }
}
