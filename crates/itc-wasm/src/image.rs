//! Browser image decoding.
//!
//! A chosen file is exposed to an `<img>` through an object URL. The URL
//! lives exactly as long as the decoded image that uses it, so it is
//! revoked when the image is replaced, when decoding fails, or when the
//! composer is dropped.

use itc_core::ImageDimensions;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, HtmlImageElement, Url};

/// An object URL, revoked on drop.
#[derive(Debug)]
struct ObjectUrl(String);

impl ObjectUrl {
    fn new(blob: &Blob) -> Result<Self, JsValue> {
        Url::create_object_url_with_blob(blob).map(Self)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if let Err(e) = Url::revoke_object_url(&self.0) {
            log::warn!("image: could not revoke {}: {e:?}", self.0);
        }
    }
}

/// A decoded `<img>` and the URL backing it.
#[derive(Debug)]
pub struct WebImage {
    element: HtmlImageElement,
    _url: ObjectUrl,
}

impl WebImage {
    pub fn element(&self) -> &HtmlImageElement {
        &self.element
    }
}

impl ImageDimensions for WebImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.element.natural_width(), self.element.natural_height())
    }
}

/// Decode `blob` into an image element.
pub async fn decode(blob: &Blob) -> Result<WebImage, JsValue> {
    let url = ObjectUrl::new(blob)?;
    let element = HtmlImageElement::new()?;
    element.set_src(&url.0);
    JsFuture::from(element.decode()).await?;
    log::debug!(
        "image: decoded {}x{}",
        element.natural_width(),
        element.natural_height()
    );
    Ok(WebImage { element, _url: url })
}
