pub mod canvas;
pub mod config;
pub mod fonts;
pub mod id;
pub mod image;
pub mod model;
pub mod store;

pub use canvas::CanvasSize;
pub use config::ComposerConfig;
pub use fonts::{FontError, FontKey, FontRegistry, UploadedFont};
pub use id::LayerId;
pub use image::{ImageDimensions, ImageError, ImageSlot, LoadTicket};
pub use model::*;
pub use store::LayerStore;
