//! Shared encoding types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::CHANNELS;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the data
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: &'static str, reason: String },

    /// Metadata could not be written into the container
    #[error("Metadata embedding failed: {0}")]
    Metadata(String),
}

/// Output format for a committed raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, keeps alpha.
    #[default]
    Png,
    /// Lossy, alpha composited over black. Quality 1-100.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    /// MIME type of the encoded output.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpeg",
        }
    }
}

/// Check an RGBA buffer against its dimensions.
pub fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * CHANNELS;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
