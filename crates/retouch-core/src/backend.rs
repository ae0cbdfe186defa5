//! The hand-off boundary to the generative image backend.
//!
//! The backend itself is opaque: it takes an encoded image, an optional
//! two-tone mask and free-text instructions, and answers with an encoded
//! image or video, or a failure message. This module defines that exchange,
//! classifies failures and tracks the quota cooldown. It never retries.

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::{encode_image, EncodeError, ExportFormat};
use crate::mask::MaskRaster;
use crate::surface::RasterSurface;

/// Message prefix the backend uses for quota failures.
pub const QUOTA_PREFIX: &str = "QUOTA_EXCEEDED:";

/// Errors at the backend boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Quota exhausted; starts the cooldown. Holds the user-facing text.
    #[error("{0}")]
    QuotaExceeded(String),

    /// Any other backend failure.
    #[error("{0}")]
    Failed(String),

    /// A request was attempted while the quota cooldown is running.
    #[error("Quota cooldown active, {remaining_secs}s remaining")]
    CoolingDown { remaining_secs: u32 },

    /// The mask does not cover the image pixel for pixel.
    #[error("Mask is {mask_width}x{mask_height} but the image is {image_width}x{image_height}")]
    MaskMismatch {
        mask_width: u32,
        mask_height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// The request payload could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl From<EncodeError> for BackendError {
    fn from(err: EncodeError) -> Self {
        BackendError::Encode(err.to_string())
    }
}

impl BackendError {
    /// Classify a raw failure message from the backend.
    pub fn from_message(message: &str) -> Self {
        match message.strip_prefix(QUOTA_PREFIX) {
            Some(rest) => BackendError::QuotaExceeded(rest.trim_start().to_string()),
            None => BackendError::Failed(message.to_string()),
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, BackendError::QuotaExceeded(_))
    }
}

/// An encoded buffer with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// One request to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub image: EncodedAsset,
    /// Two-tone PNG of the same pixel size as `image`.
    pub mask: Option<EncodedAsset>,
    pub instructions: String,
    width: u32,
    height: u32,
}

impl BackendRequest {
    /// Encode `image` as the request image.
    pub fn new(
        image: &DecodedImage,
        format: ExportFormat,
        instructions: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let bytes = encode_image(image, format, None)?;
        Ok(Self {
            image: EncodedAsset {
                bytes,
                mime_type: format.mime_type().to_string(),
            },
            mask: None,
            instructions: instructions.into(),
            width: image.width,
            height: image.height,
        })
    }

    /// Attach the two-tone export of `mask`.
    pub fn with_mask(mut self, mask: &MaskRaster) -> Result<Self, BackendError> {
        if (mask.width(), mask.height()) != (self.width, self.height) {
            return Err(BackendError::MaskMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                image_width: self.width,
                image_height: self.height,
            });
        }
        self.mask = Some(EncodedAsset {
            bytes: mask.export_png()?,
            mime_type: ExportFormat::Png.mime_type().to_string(),
        });
        Ok(self)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// What the backend produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutput {
    Image(EncodedAsset),
    Video(EncodedAsset),
}

/// A generative backend.
pub trait GenerativeBackend {
    fn submit(&mut self, request: &BackendRequest) -> Result<BackendOutput, BackendError>;
}

/// Quota cooldown window, driven by caller-supplied millisecond clocks.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaCooldown {
    duration_ms: f64,
    until_ms: Option<f64>,
}

impl QuotaCooldown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_ms: duration_secs as f64 * 1000.0,
            until_ms: None,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.until_ms = Some(now_ms + self.duration_ms);
        log::info!("backend: quota cooldown until {}", now_ms + self.duration_ms);
    }

    /// Whether the window is still open; clears it once expired.
    pub fn is_active(&mut self, now_ms: f64) -> bool {
        match self.until_ms {
            Some(until) if now_ms < until => true,
            Some(_) => {
                self.until_ms = None;
                false
            }
            None => false,
        }
    }

    /// Whole seconds left, rounded up. 0 when inactive.
    pub fn remaining_secs(&self, now_ms: f64) -> u32 {
        match self.until_ms {
            Some(until) if now_ms < until => ((until - now_ms) / 1000.0).ceil() as u32,
            _ => 0,
        }
    }

    /// Change the window length for later quota failures. A running
    /// window keeps its end time.
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration_ms = duration_secs as f64 * 1000.0;
    }
}

/// Submit `request`, honouring and maintaining the quota cooldown.
pub fn submit<B>(
    backend: &mut B,
    request: &BackendRequest,
    cooldown: &mut QuotaCooldown,
    now_ms: f64,
) -> Result<BackendOutput, BackendError>
where
    B: GenerativeBackend + ?Sized,
{
    if cooldown.is_active(now_ms) {
        return Err(BackendError::CoolingDown {
            remaining_secs: cooldown.remaining_secs(now_ms),
        });
    }

    let result = backend.submit(request);
    if let Err(err) = &result {
        log::warn!("backend: request failed: {err}");
        if err.is_quota() {
            cooldown.start(now_ms);
        }
    }
    result
}
