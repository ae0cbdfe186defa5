//! Freehand selection masks for inpainting.
//!
//! The user paints over the image with a round brush; the painted region is
//! what a downstream fill is allowed to change.
//!
//! ## Representation
//!
//! [`MaskRaster`] keeps one coverage byte per image pixel: 0 is untouched,
//! anything above 0 is painted. While editing it renders as a translucent
//! yellow overlay.
//!
//! ## Export contract
//!
//! [`MaskRaster::export`] produces a fully opaque two-tone image: painted
//! pixels are `(0, 0, 0, 255)`, untouched pixels `(255, 255, 255, 255)`.
//! Consumers rely on exactly these two values.

mod raster;
mod stroke;

pub use raster::MaskRaster;
pub use stroke::{segment_coverage, segment_distance};

/// Overlay color of painted pixels.
pub const OVERLAY_RGB: [u8; 3] = [250, 204, 21];

/// Coverage of a fully painted pixel (60% opacity).
pub const OVERLAY_ALPHA: u8 = 153;

/// Export color of painted pixels.
pub const PAINTED: [u8; 4] = [0, 0, 0, 255];

/// Export color of untouched pixels.
pub const UNTOUCHED: [u8; 4] = [255, 255, 255, 255];
