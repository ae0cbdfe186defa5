//! Image encoding for export and hand-off.
//!
//! This module provides functionality for:
//! - Encoding RGBA rasters to lossless PNG (also used for the inpainting mask)
//! - Encoding to JPEG with a quality setting and an optional EXIF comment
//!
//! All operations are synchronous and single-threaded.

mod comment;
mod jpeg;
mod png;
mod types;

pub use comment::{embed_comment, read_comment};
pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use types::{validate_rgba, EncodeError, ExportFormat};

use crate::decode::DecodedImage;

/// Encode a raster in the requested export format.
///
/// `comment` is only honoured for JPEG; embedding it is best-effort and a
/// failure there never fails the export.
pub fn encode_image(
    image: &DecodedImage,
    format: ExportFormat,
    comment: Option<&str>,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(&image.pixels, image.width, image.height),
        ExportFormat::Jpeg { quality } => {
            let jpeg = encode_jpeg(&image.pixels, image.width, image.height, quality)?;
            match comment.map(str::trim).filter(|c| !c.is_empty()) {
                Some(text) => Ok(embed_comment(&jpeg, text).unwrap_or_else(|e| {
                    log::warn!("failed to embed export comment, continuing without it: {e}");
                    jpeg
                })),
                None => Ok(jpeg),
            }
        }
    }
}
