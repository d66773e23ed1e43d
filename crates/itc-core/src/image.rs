//! Image loading state.
//!
//! Decoding itself is backend work (the `image` crate natively, an
//! `HtmlImageElement` in the browser). This module owns the part that must
//! behave the same everywhere: the media-type gate, and generation tickets
//! so a superseded load can never overwrite a newer one.

use thiserror::Error;

/// The only raster type the loader accepts.
pub const ACCEPTED_IMAGE_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("image has zero size")]
    Empty,
}

/// Anything the loader can hold must report its intrinsic size.
pub trait ImageDimensions {
    fn dimensions(&self) -> (u32, u32);
}

/// Proof that a load was started; only the latest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Current image plus the generation of the most recent load.
#[derive(Debug)]
pub struct ImageSlot<I> {
    image: Option<I>,
    generation: u64,
}

impl<I> Default for ImageSlot<I> {
    fn default() -> Self {
        Self {
            image: None,
            generation: 0,
        }
    }
}

impl<I: ImageDimensions> ImageSlot<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `media_type` is the accepted raster type.
    pub fn accepts(media_type: &str) -> bool {
        media_type.eq_ignore_ascii_case(ACCEPTED_IMAGE_TYPE)
    }

    /// Start a load for a file of `media_type`.
    ///
    /// Any in-flight load is superseded. A non-accepted type is not an
    /// error: the slot is cleared and `None` is returned.
    pub fn begin(&mut self, media_type: Option<&str>) -> Option<LoadTicket> {
        self.generation += 1;
        match media_type {
            Some(t) if Self::accepts(t) => Some(LoadTicket(self.generation)),
            other => {
                log::debug!("image: {other:?} is not {ACCEPTED_IMAGE_TYPE}, clearing");
                self.image = None;
                None
            }
        }
    }

    /// Complete a load. A stale ticket is ignored and returns false; a
    /// failed decode (`None`) clears the image.
    pub fn finish(&mut self, ticket: LoadTicket, image: Option<I>) -> bool {
        if ticket.0 != self.generation {
            log::warn!(
                "image: dropping stale load (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.image = image;
        true
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.image = None;
    }

    pub fn get(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(ImageDimensions::dimensions)
    }
}
