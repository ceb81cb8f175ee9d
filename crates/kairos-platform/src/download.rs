//! Save generated text as a file through a temporary object URL.

use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use kairos_types::{KioskError, Result};

pub const TSV_MIME: &str = "text/tab-separated-values;charset=utf-8";

pub fn download_text(filename: &str, content: &str, mime: &str) -> Result<()> {
    // BOM so spreadsheet apps detect UTF-8
    let parts = js_sys::Array::of1(&JsValue::from_str(&format!("\u{feff}{}", content)));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let anchor: HtmlAnchorElement = gloo_utils::document()
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| KioskError::JsInterop("created element is not an anchor".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url).map_err(js_error)?;
    log::info!("Downloaded {}", filename);
    Ok(())
}

fn js_error(e: JsValue) -> KioskError {
    KioskError::JsInterop(format!("{:?}", e))
}
