//! Bounding box of the flipped and rotated image.

use super::Size;

/// Total rotation applied to the image, in degrees.
///
/// The discrete quarter-turn and the continuous straighten angle are summed
/// before any conversion to radians.
#[inline]
pub fn composed_angle_degrees(rotation: i32, straighten: f64) -> f64 {
    rotation as f64 + straighten
}

/// Size of the axis-aligned box containing a `size` image rotated by
/// `angle_degrees`.
///
/// `new_w = w·|cos θ| + h·|sin θ|`, `new_h = w·|sin θ| + h·|cos θ|`.
///
/// Exact quarter turns are resolved without trigonometry so that a 90°
/// rotation swaps the sides exactly instead of leaving `1e-14` residue.
/// Flipping does not affect the box. The result is fractional; the live
/// preview and the compositor must both use this value.
pub fn rotated_bounds(size: Size, angle_degrees: f64) -> Size {
    let normalized = angle_degrees.rem_euclid(360.0);
    let quarters = (normalized / 90.0).round();
    if (normalized - quarters * 90.0).abs() < 1e-9 {
        return if quarters as i64 % 2 == 1 {
            Size::new(size.height, size.width)
        } else {
            size
        };
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    Size::new(
        size.width * cos + size.height * sin,
        size.width * sin + size.height * cos,
    )
}

/// Whole-pixel dimensions of a raster holding `bounds`, at least 1x1.
pub fn raster_dimensions(bounds: Size) -> (u32, u32) {
    let side = |v: f64| {
        if v.is_finite() {
            v.round().clamp(1.0, u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (side(bounds.width), side(bounds.height))
}
