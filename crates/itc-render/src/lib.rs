pub mod fonts;
pub mod hit;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod scene;

pub use fonts::FontBook;
pub use hit::hit_test;
pub use layout::{FixedAdvance, TextMeasure, line_offset, wrap_lines};
pub use paint::{Painter, paint_scene};
pub use raster::{Bitmap, ExportError, RasterPainter, decode_png, export_png};
pub use scene::{DragOverride, ImageNode, Scene, TextNode};
