//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG or JPEG bytes to RGBA, EXIF orientation applied
//! - [`decode_image_raw_orientation`] - Same, without orientation correction
//! - [`image_orientation`] - The EXIF orientation tag value (1-8)
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@retouch/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(image.pixels()), image.width), 0, 0);
//! ```

use crate::types::JsDecodedImage;
use retouch_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an encoded image into RGBA pixels.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image or are
/// truncated.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode without applying the EXIF orientation.
#[wasm_bindgen]
pub fn decode_image_raw_orientation(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image_no_orientation(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// EXIF orientation of `bytes`; 1 when absent.
#[wasm_bindgen]
pub fn image_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use retouch_core::encode::encode_png;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_empty() {
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let pixels = vec![200u8; 4 * 3 * 4];
        let png = encode_png(&pixels, 4, 3).unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.pixels(), pixels);
    }
}
