//! The flipped and rotated intermediate raster.
//!
//! # Algorithm
//!
//! Inverse mapping: for each output pixel center, undo the rotation, then
//! the flip, and sample the source there. With `d` the offset from the
//! output center and θ the composed angle:
//! ```text
//! lx =  dx·cos θ + dy·sin θ
//! ly = -dx·sin θ + dy·cos θ
//! src = (lx·scale_x, ly) + source center
//! ```
//!
//! Exact quarter turns use exact trigonometry and pick pixels directly, so
//! 0/90/180/270 degree results are lossless.

use serde::{Deserialize, Serialize};

use super::{sample, InterpolationFilter};
use crate::decode::DecodedImage;
use crate::geometry::{raster_dimensions, rotated_bounds, Size};
use crate::surface::{allocate_surface, RasterSurface, SurfaceError};

/// Orientation part of an edit: composed angle and horizontal scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformParams {
    /// Quarter turns plus straighten, in degrees.
    pub angle_degrees: f64,
    /// `1.0`, or `-1.0` for a horizontal flip.
    pub scale_x: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            angle_degrees: 0.0,
            scale_x: 1.0,
        }
    }
}

impl TransformParams {
    pub fn new(angle_degrees: f64, scale_x: f64) -> Self {
        Self {
            angle_degrees,
            scale_x,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.scale_x < 0.0
    }

    /// Fractional bounding box of a `source`-sized image under this
    /// transform.
    pub fn bounds(&self, source: Size) -> Size {
        rotated_bounds(source, self.angle_degrees)
    }
}

/// Quarter-turn count for angles that are exact multiples of 90 degrees.
fn quarter_turns(angle_degrees: f64) -> Option<usize> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let quarters = (normalized / 90.0).round();
    ((normalized - quarters * 90.0).abs() < 1e-9).then(|| quarters as usize % 4)
}

/// Render `image` flipped and rotated into its bounding-box raster.
///
/// The raster is the rounded bounding box (at least 1x1) with the content
/// centered in it; uncovered corners are transparent.
pub fn render_transformed(
    image: &DecodedImage,
    params: &TransformParams,
    filter: InterpolationFilter,
) -> Result<DecodedImage, SurfaceError> {
    let (src_w, src_h) = (image.width as f64, image.height as f64);
    let bounds = params.bounds(Size::new(src_w, src_h));
    let (dst_w, dst_h) = raster_dimensions(bounds);
    let mut output = allocate_surface(dst_w, dst_h)?;

    let quarters = quarter_turns(params.angle_degrees);
    let (sin, cos) = match quarters {
        Some(0) => (0.0, 1.0),
        Some(1) => (1.0, 0.0),
        Some(2) => (0.0, -1.0),
        Some(_) => (-1.0, 0.0),
        None => params.angle_degrees.to_radians().sin_cos(),
    };
    let scale_x = if params.is_flipped() { -1.0 } else { 1.0 };

    // Center of source and destination images
    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    for dst_y in 0..dst_h {
        let dy = dst_y as f64 + 0.5 - dst_cy;
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 + 0.5 - dst_cx;

            let lx = dx * cos + dy * sin;
            let ly = -dx * sin + dy * cos;
            let src_x = lx * scale_x + src_cx - 0.5;
            let src_y = ly + src_cy - 0.5;

            let pixel = if quarters.is_some() {
                nearest(image, src_x, src_y)
            } else {
                sample(image, src_x, src_y, filter)
            };
            output.write_pixel(dst_x, dst_y, pixel)?;
        }
    }

    log::debug!(
        "rendered {}x{} -> {}x{} at {:.2} deg{}",
        image.width,
        image.height,
        dst_w,
        dst_h,
        params.angle_degrees,
        if params.is_flipped() { " flipped" } else { "" }
    );
    Ok(output)
}

#[inline]
fn nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    let (ix, iy) = (x.round(), y.round());
    if ix < 0.0 || iy < 0.0 {
        return [0, 0, 0, 0];
    }
    image.read_pixel(ix as u32, iy as u32).unwrap_or_default()
}
