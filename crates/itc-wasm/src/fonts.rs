//! Browser font loading.
//!
//! Catalog families are pulled in with a stylesheet `<link>` whose id is the
//! family's loaded-set key; uploads go through the `FontFace` API.

use itc_core::fonts::{FontError, FontKey, UploadedFont};
use itc_editor::stylesheet_url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, File, FontFace, HtmlLinkElement};

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn js_reason(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

/// Inject the family's stylesheet (once) and wait for the face to load.
pub async fn load_catalog(key: &FontKey) -> Result<(), FontError> {
    inject_and_wait(key).await.map_err(|e| FontError::Catalog {
        family: key.family.clone(),
        reason: js_reason(e),
    })
}

async fn inject_and_wait(key: &FontKey) -> Result<(), JsValue> {
    let doc = document()?;
    if doc.get_element_by_id(&key.key).is_none() {
        let link: HtmlLinkElement = doc.create_element("link")?.dyn_into()?;
        link.set_id(&key.key);
        link.set_rel("stylesheet");
        link.set_href(&stylesheet_url(&key.family));
        let head = doc.head().ok_or_else(|| JsValue::from_str("no <head>"))?;
        head.append_child(&link)?;
    }
    JsFuture::from(doc.fonts().load(&format!("16px \"{}\"", key.family))).await?;
    Ok(())
}

/// Validate `file`, register its face with the document, and return the
/// upload on success.
pub async fn install_upload(file: &File) -> Result<UploadedFont, FontError> {
    let font = UploadedFont::from_file(&file.name(), &file.type_())?;
    let decode_err = |e: JsValue| FontError::Decode {
        family: font.family.clone(),
        reason: js_reason(e),
    };

    let buffer = JsFuture::from(file.array_buffer()).await.map_err(decode_err)?;
    let face = FontFace::new_with_array_buffer(&font.family, &buffer.unchecked_into())
        .map_err(decode_err)?;
    JsFuture::from(face.load().map_err(decode_err)?)
        .await
        .map_err(decode_err)?;
    document()
        .and_then(|doc| doc.fonts().add(&face))
        .map_err(decode_err)?;
    log::debug!("fonts: installed upload {:?}", font.family);
    Ok(font)
}
