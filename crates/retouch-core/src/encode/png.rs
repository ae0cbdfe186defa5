//! Lossless PNG encoding.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_rgba, EncodeError};

/// Encode RGBA pixel data to PNG bytes.
///
/// Alpha is preserved exactly, which is what the matting output and the
/// two-tone inpainting mask rely on.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}
