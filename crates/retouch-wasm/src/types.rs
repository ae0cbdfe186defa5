//! WASM-compatible wrapper types for image data.
//!
//! Pixels cross the boundary as RGBA8 with straight alpha, the layout of
//! `ImageData.data` on a 2D canvas.

use retouch_core::decode::DecodedImage;
use retouch_core::transform::InterpolationFilter;
use wasm_bindgen::prelude::*;

/// A decoded image wrapper for JavaScript.
///
/// The pixel data is stored in WASM memory. `pixels()` copies it out as a
/// `Uint8Array`, suitable for `new ImageData(new Uint8ClampedArray(...))`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from dimensions and RGBA pixel data (4 bytes per
    /// pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (`width * height * 4`).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data. This is a copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the WASM memory now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core image.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels.clone())
    }
}

/// Map a filter name from JavaScript. Anything but `"lanczos3"` is bilinear.
pub(crate) fn interpolation_from_str(name: &str) -> InterpolationFilter {
    match name {
        "lanczos3" | "Lanczos3" => InterpolationFilter::Lanczos3,
        _ => InterpolationFilter::Bilinear,
    }
}
