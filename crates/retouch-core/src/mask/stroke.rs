//! Brush stroke geometry.
//!
//! A stroke segment with round caps and joins is a capsule: every point
//! within `radius` of the segment. Pixel coverage is anti-aliased over one
//! pixel across the capsule edge.

use crate::geometry::Point;

/// Distance from `p` to the segment `a`-`b`.
///
/// # Algorithm
/// 1. Project `p` onto the line through `a` and `b`
/// 2. Clamp the projection to the segment
/// 3. Measure the distance to the clamped point
#[inline]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;

    // Degenerate case: a single dab
    let t = if len_sq < f64::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Coverage (0.0 to 1.0) of the pixel whose center is `center` by a
/// capsule of `radius` around `a`-`b`.
#[inline]
pub fn segment_coverage(center: Point, a: Point, b: Point, radius: f64) -> f64 {
    (radius + 0.5 - segment_distance(center, a, b)).clamp(0.0, 1.0)
}
