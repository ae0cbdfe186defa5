//! Background removal bindings.

use crate::types::JsDecodedImage;
use retouch_core::matting::{self, BackgroundColors};
use wasm_bindgen::prelude::*;

/// Make the sampled background of `image` transparent.
///
/// `tolerance` is compared with the RGB distance directly; the editor's
/// slider runs 0-100 with a default of 20.
#[wasm_bindgen]
pub fn remove_background(image: &JsDecodedImage, tolerance: f64) -> JsDecodedImage {
    JsDecodedImage::from_decoded(matting::remove_background(&image.to_decoded(), tolerance))
}

/// The detected background colors as `{ primary, secondary, tolerance }`,
/// or `undefined` for an empty image.
#[wasm_bindgen]
pub fn detect_background(image: &JsDecodedImage, tolerance: f64) -> Result<JsValue, JsValue> {
    match BackgroundColors::detect(&image.to_decoded(), tolerance) {
        Some(colors) => serde_wasm_bindgen::to_value(&colors).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(JsValue::UNDEFINED),
    }
}
