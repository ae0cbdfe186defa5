//! Image encoding WASM bindings for download and backend hand-off.
//!
//! # Functions
//!
//! - [`encode_png`] - Lossless RGBA PNG
//! - [`encode_jpeg`] - JPEG with quality and an optional embedded comment
//! - [`read_jpeg_comment`] - Read back the embedded comment
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg } from '@retouch/wasm';
//!
//! const jpeg = encode_jpeg(image, 92, 'restored portrait');
//! const blob = new Blob([jpeg], { type: 'image/jpeg' });
//! ```

use crate::types::JsDecodedImage;
use retouch_core::encode::{self, ExportFormat};
use wasm_bindgen::prelude::*;

/// Encode an image as PNG, keeping alpha.
#[wasm_bindgen]
pub fn encode_png(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_image(&image.to_decoded(), ExportFormat::Png, None)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode an image as JPEG.
///
/// Transparent pixels come out black. A non-empty `comment` is embedded in
/// the EXIF metadata when possible; failing to embed it is not an error.
///
/// # Quality Guidelines
///
/// * 90-100: High quality (editor default: 92)
/// * 60-90: Web and sharing
/// * Below 60: Visible artifacts
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsDecodedImage, quality: u8, comment: Option<String>) -> Result<Vec<u8>, JsValue> {
    encode::encode_image(
        &image.to_decoded(),
        ExportFormat::Jpeg { quality },
        comment.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The comment embedded by [`encode_jpeg`], if any.
#[wasm_bindgen]
pub fn read_jpeg_comment(bytes: &[u8]) -> Option<String> {
    encode::read_comment(bytes)
}
