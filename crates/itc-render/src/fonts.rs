//! Font book for the raster painter.
//!
//! Wraps a cosmic-text `FontSystem`. Installed faces are registered under
//! the family name they declare internally, so the user-visible family (the
//! upload's file name, or the catalog name) is kept as an alias.

use crate::layout::{FixedAdvance, TextMeasure};
use crate::scene::{LINE_HEIGHT, TextNode};
use cosmic_text::fontdb::{Database, Source};
use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, Weight, Wrap,
};
use itc_core::fonts::FontError;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FontBook {
    pub(crate) system: FontSystem,
    pub(crate) swash: SwashCache,
    /// User-visible family → family name declared by the installed face.
    aliases: HashMap<String, String>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// Font book seeded with the platform's installed fonts.
    pub fn new() -> Self {
        Self::with_system(FontSystem::new())
    }

    /// Font book with no fonts at all; only installed faces render.
    pub fn empty() -> Self {
        Self::with_system(FontSystem::new_with_locale_and_db(
            "en-US".to_string(),
            Database::new(),
        ))
    }

    pub fn with_system(system: FontSystem) -> Self {
        Self {
            system,
            swash: SwashCache::new(),
            aliases: HashMap::new(),
        }
    }

    /// Register font bytes under `family`.
    ///
    /// Fails with `FontError::Decode` if the data holds no usable face
    /// (cosmic-text reads TrueType/OpenType containers only).
    pub fn install(&mut self, family: &str, data: Vec<u8>) -> Result<(), FontError> {
        let ids = self
            .system
            .db_mut()
            .load_font_source(Source::Binary(Arc::new(data)));

        let declared = ids
            .first()
            .and_then(|id| self.system.db().face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| FontError::Decode {
                family: family.to_string(),
                reason: "no font face found in data".to_string(),
            })?;

        log::debug!("fontbook: {family:?} → face family {declared:?}");
        self.aliases.insert(family.to_string(), declared);
        Ok(())
    }

    /// Family name to ask cosmic-text for, or `None` to use the default
    /// sans-serif fallback.
    pub fn resolve(&self, family: &str) -> Option<String> {
        if let Some(declared) = self.aliases.get(family) {
            return Some(declared.clone());
        }
        let known = self.system.db().faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        });
        known.then(|| family.to_string())
    }

    /// True when not even a fallback face exists.
    pub fn is_empty(&self) -> bool {
        self.system.db().is_empty()
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.resolve(family).is_some()
    }

    /// Shape one line of text in `node`'s font, without wrapping.
    ///
    /// Must not be called on an empty book: cosmic-text has nothing to
    /// fall back to.
    pub(crate) fn shape_line(&mut self, node: &TextNode, text: &str) -> Buffer {
        let family_name = self.resolve(&node.font_family);
        let family = match family_name.as_deref() {
            Some(name) => Family::Name(name),
            None => Family::SansSerif,
        };
        let attrs = Attrs::new()
            .family(family)
            .weight(Weight(node.font_style.weight()))
            .style(if node.font_style.is_italic() {
                Style::Italic
            } else {
                Style::Normal
            });

        let system = &mut self.system;
        let metrics = Metrics::new(node.font_size, node.font_size * LINE_HEIGHT as f32);
        let mut buffer = Buffer::new(system, metrics);
        buffer.set_wrap(system, Wrap::None);
        buffer.set_text(system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(system, false);
        buffer
    }
}

/// Advance of the widest run in a shaped buffer.
pub(crate) fn line_width(buffer: &Buffer) -> f32 {
    buffer.layout_runs().map(|run| run.line_w).fold(0.0, f32::max)
}

impl TextMeasure for FontBook {
    fn measure(&mut self, node: &TextNode, text: &str) -> f32 {
        if self.is_empty() {
            return FixedAdvance::default().measure(node, text);
        }
        line_width(&self.shape_line(node, text))
    }
}
