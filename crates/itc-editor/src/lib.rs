pub mod catalog;
pub mod editor;
pub mod input;
pub mod session;

pub use catalog::{CatalogClient, CatalogError, first_font_url, stylesheet_url};
pub use editor::{Editor, ROTATION_STEP};
pub use input::InputEvent;
pub use session::Session;
