//! Canvas size derivation.
//!
//! The canvas is never authoritative: width follows the container, height
//! follows the loaded image's aspect ratio. Recomputed on image load and on
//! container resize.

use serde::{Deserialize, Serialize};

/// Height/width ratio used when no image is loaded.
pub const DEFAULT_ASPECT: f32 = 1.0;

/// Logical canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    /// Stage size before the container has been measured.
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Derive the canvas from the container width and the intrinsic image
    /// dimensions, if an image is loaded.
    pub fn derive(container_width: f32, image: Option<(u32, u32)>) -> Self {
        let width = container_width.max(0.0);
        let aspect = match image {
            Some((w, h)) if w > 0 => h as f32 / w as f32,
            _ => DEFAULT_ASPECT,
        };
        Self {
            width,
            height: width * aspect,
        }
    }

    /// Whole device-pixel dimensions for rasterization (at least 1×1).
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        let px = |v: f32| {
            if v.is_finite() {
                (v.round() as u32).max(1)
            } else {
                1
            }
        };
        (px(self.width), px(self.height))
    }
}
