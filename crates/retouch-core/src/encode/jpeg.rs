//! JPEG encoding for lossy export.
//!
//! JPEG has no alpha channel. Transparent areas (for example after
//! background removal) are composited over black before encoding, which
//! is what a browser canvas produces for the same export.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_rgba, EncodeError};

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let quality = quality.clamp(1, 100);
    let rgb = flatten_over_black(pixels);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Drop alpha by compositing each pixel over opaque black.
fn flatten_over_black(pixels: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    for px in pixels.chunks_exact(4) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * a + 127) / 255) as u8);
        }
    }
    rgb
}
