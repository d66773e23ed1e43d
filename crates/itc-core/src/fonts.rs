//! Font registry: which families can be picked, and which are loaded.
//!
//! Three sources feed the picker:
//!
//! - **local** families the platform is expected to have (`Arial`),
//! - **catalog** families fetched on demand from a web-font service,
//! - **uploaded** families the user installed from a font file.
//!
//! Loading is idempotent per family: the first `begin_load` marks the
//! sanitized key as loaded and hands out a `FontKey`; every later call for
//! that family returns `None`. Catalog failures are logged and swallowed,
//! rendering falls back to the platform default.

use smallvec::SmallVec;
use std::collections::HashSet;
use thiserror::Error;

pub const LOCAL_FONTS: &[&str] = &["Arial"];
pub const CATALOG_FONTS: &[&str] = &["Roboto", "Lato", "Open Sans", "Montserrat", "Poppins", "Oswald"];

/// Media types accepted for uploaded font files.
pub const FONT_MEDIA_TYPES: &[&str] = &[
    "font/ttf",
    "font/otf",
    "font/woff",
    "font/woff2",
    "application/font-woff",
    "application/x-font-ttf",
    "application/x-font-otf",
];

/// File extensions accepted for uploaded font files (compared lowercase).
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "woff2"];

pub const UNSUPPORTED_FONT_MESSAGE: &str = "Please upload a font file (TTF/OTF/WOFF/WOFF2).";

#[derive(Debug, Error)]
pub enum FontError {
    /// Shown to the user verbatim.
    #[error("{}", UNSUPPORTED_FONT_MESSAGE)]
    UnsupportedFormat { file_name: String },
    #[error("could not decode font `{family}`: {reason}")]
    Decode { family: String, reason: String },
    #[error("font catalog request for `{family}` failed: {reason}")]
    Catalog { family: String, reason: String },
}

/// Loaded-set key for a family: `gfont-` plus the name with whitespace runs
/// replaced by `-`.
pub fn sanitize_family(family: &str) -> String {
    let mut key = String::from("gfont-");
    let mut words = family.split_whitespace().peekable();
    while let Some(word) = words.next() {
        key.push_str(word);
        if words.peek().is_some() {
            key.push('-');
        }
    }
    key
}

/// A pending catalog load handed out by `FontRegistry::begin_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub key: String,
}

/// A validated font upload: the accepted file plus the family derived from
/// its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFont {
    pub family: String,
    pub file_name: String,
}

impl UploadedFont {
    /// Validate a font file by media type or extension and derive its family
    /// (`MyFont.woff2` → `MyFont`).
    pub fn from_file(file_name: &str, media_type: &str) -> Result<Self, FontError> {
        let stem_and_ext = file_name
            .rsplit_once('.')
            .filter(|(_, ext)| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

        let type_ok = FONT_MEDIA_TYPES.contains(&media_type);
        if !type_ok && stem_and_ext.is_none() {
            return Err(FontError::UnsupportedFormat {
                file_name: file_name.to_string(),
            });
        }

        let family = match stem_and_ext {
            Some((stem, _)) => stem,
            None => file_name,
        };
        if family.trim().is_empty() {
            return Err(FontError::UnsupportedFormat {
                file_name: file_name.to_string(),
            });
        }

        Ok(Self {
            family: family.to_string(),
            file_name: file_name.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FontRegistry {
    local: Vec<String>,
    catalog: Vec<String>,
    /// Most recent first, no duplicates.
    uploaded: SmallVec<[String; 4]>,
    loaded: HashSet<String>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new(
            LOCAL_FONTS.iter().map(|s| s.to_string()).collect(),
            CATALOG_FONTS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl FontRegistry {
    pub fn new(local: Vec<String>, catalog: Vec<String>) -> Self {
        Self {
            local,
            catalog,
            uploaded: SmallVec::new(),
            loaded: HashSet::new(),
        }
    }

    /// Swap in a catalog listing (e.g. from the web-font service).
    pub fn set_catalog(&mut self, families: Vec<String>) {
        log::debug!("fonts: catalog now lists {} families", families.len());
        self.catalog = families;
    }

    pub fn is_catalog(&self, family: &str) -> bool {
        !self.local.iter().any(|f| f == family) && self.catalog.iter().any(|f| f == family)
    }

    pub fn is_uploaded(&self, family: &str) -> bool {
        self.uploaded.iter().any(|f| f == family)
    }

    pub fn uploaded(&self) -> &[String] {
        &self.uploaded
    }

    pub fn is_loaded(&self, family: &str) -> bool {
        self.loaded.contains(&sanitize_family(family))
    }

    /// Families offered for a layer currently using `current`, in precedence
    /// order: the current family, uploaded (newest first), then local and
    /// catalog families. Deduplicated, first occurrence wins.
    pub fn list_available(&self, current: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        std::iter::once(current)
            .chain(self.uploaded.iter().map(String::as_str))
            .chain(self.local.iter().map(String::as_str))
            .chain(self.catalog.iter().map(String::as_str))
            .filter(|f| seen.insert(*f))
            .map(str::to_string)
            .collect()
    }

    /// Claim the load of a catalog family. Returns `None` for non-catalog
    /// families and for families already claimed.
    pub fn begin_load(&mut self, family: &str) -> Option<FontKey> {
        if !self.is_catalog(family) {
            return None;
        }
        let key = sanitize_family(family);
        if !self.loaded.insert(key.clone()) {
            return None;
        }
        log::debug!("fonts: loading catalog family {family:?}");
        Some(FontKey {
            family: family.to_string(),
            key,
        })
    }

    /// Record the outcome of a catalog load. Failures are not retried.
    pub fn finish_load(&mut self, key: &FontKey, result: Result<(), FontError>) {
        match result {
            Ok(()) => log::debug!("fonts: {} ready", key.family),
            Err(e) => log::warn!("fonts: {e}; falling back to default font"),
        }
    }

    /// Put a freshly installed family at the front of the uploaded list.
    pub fn record_uploaded(&mut self, family: &str) {
        self.uploaded.retain(|f| f != family);
        self.uploaded.insert(0, family.to_string());
        self.loaded.insert(sanitize_family(family));
        log::debug!("fonts: uploaded family {family:?} installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_family("Open Sans"), "gfont-Open-Sans");
        assert_eq!(sanitize_family("  Fira   Code "), "gfont-Fira-Code");
    }

    #[test]
    fn list_puts_current_then_uploaded_then_builtin() {
        let mut reg = FontRegistry::default();
        reg.record_uploaded("Handwriting");
        reg.record_uploaded("Stencil");
        let list = reg.list_available("Lato");
        assert_eq!(
            list,
            vec![
                "Lato",
                "Stencil",
                "Handwriting",
                "Arial",
                "Roboto",
                "Open Sans",
                "Montserrat",
                "Poppins",
                "Oswald"
            ]
        );
    }

    #[test]
    fn unusual_current_font_stays_selectable() {
        let reg = FontRegistry::default();
        assert_eq!(reg.list_available("Comic Sans MS")[0], "Comic Sans MS");
    }

    #[test]
    fn begin_load_is_idempotent_and_catalog_only() {
        let mut reg = FontRegistry::default();
        assert_eq!(reg.begin_load("Arial"), None);
        assert_eq!(reg.begin_load("Not Listed"), None);
        let key = reg.begin_load("Open Sans").unwrap();
        assert_eq!(key.key, "gfont-Open-Sans");
        assert_eq!(reg.begin_load("Open Sans"), None);
        assert!(reg.is_loaded("Open Sans"));
    }

    #[test]
    fn failed_load_is_not_retried() {
        let mut reg = FontRegistry::default();
        let key = reg.begin_load("Roboto").unwrap();
        reg.finish_load(
            &key,
            Err(FontError::Catalog {
                family: "Roboto".into(),
                reason: "offline".into(),
            }),
        );
        assert_eq!(reg.begin_load("Roboto"), None);
    }

    #[test]
    fn upload_derives_family_from_file_name() {
        let font = UploadedFont::from_file("MyFont.woff2", "").unwrap();
        assert_eq!(font.family, "MyFont");
        let font = UploadedFont::from_file("Brand.Bold.TTF", "").unwrap();
        assert_eq!(font.family, "Brand.Bold");
        let font = UploadedFont::from_file("blob", "font/otf").unwrap();
        assert_eq!(font.family, "blob");
    }

    #[test]
    fn upload_rejects_other_files() {
        let err = UploadedFont::from_file("photo.png", "image/png").unwrap_err();
        assert!(matches!(err, FontError::UnsupportedFormat { .. }));
        assert_eq!(err.to_string(), UNSUPPORTED_FONT_MESSAGE);
        assert!(UploadedFont::from_file(".ttf", "").is_err());
    }

    #[test]
    fn repeat_uploads_are_deduplicated() {
        let mut reg = FontRegistry::default();
        reg.record_uploaded("MyFont");
        reg.record_uploaded("Other");
        reg.record_uploaded("MyFont");
        assert_eq!(reg.uploaded(), ["MyFont".to_string(), "Other".to_string()]);
        assert_eq!(reg.list_available("Arial")[1], "MyFont");
    }
}
