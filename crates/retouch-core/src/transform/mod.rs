//! Raster transforms: the flipped and rotated intermediate, and region
//! extraction from it.
//!
//! # Transform Order
//!
//! At apply time the source image goes through:
//! 1. Horizontal flip (`scale_x = -1`), in the image's local space
//! 2. Rotation by the composed angle (quarter turns + straighten)
//! 3. Region extraction (explicit crop or visible viewport)
//! 4. Color filter, applied while the region is drawn
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//!   (y axis pointing down)
//! - Regions are fractional rectangles in transformed space
//! - Origin is top-left corner

mod crop;
mod rotation;
mod sample;

use serde::{Deserialize, Serialize};

pub use crop::extract_region;
pub use rotation::{render_transformed, TransformParams};
pub use sample::{sample, sample_bilinear, sample_lanczos3};

/// Interpolation filter for resampling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation, matching what a browser canvas does.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}
