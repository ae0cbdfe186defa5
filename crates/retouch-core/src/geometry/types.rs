//! Plain geometric value types.

use serde::{Deserialize, Serialize};

/// A point or offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in any of the coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True when both sides are positive and finite.
    ///
    /// A container that is not laid out yet reports `0x0`.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scale(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// An axis-aligned rectangle with fractional coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow width and height to at least one pixel.
    ///
    /// The origin stays put; only degenerate extents change.
    pub fn with_min_extent(self) -> Rect {
        Rect {
            width: self.width.max(1.0),
            height: self.height.max(1.0),
            ..self
        }
    }

    /// Whole-pixel output dimensions for drawing this rectangle 1:1.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (round_extent(self.width), round_extent(self.height))
    }
}

fn round_extent(v: f64) -> u32 {
    if v.is_finite() {
        (v.round().max(1.0)).min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// A crop drag captured in screen coordinates.
///
/// The corners are kept exactly as the pointer reported them; the start
/// corner may be right of or below the end corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropBox {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl CropBox {
    /// A zero-size box anchored at the pointer-down position.
    pub fn anchored(at: Point) -> Self {
        Self {
            start_x: at.x,
            start_y: at.y,
            end_x: at.x,
            end_y: at.y,
        }
    }

    /// Move the free corner.
    pub fn drag_to(&mut self, to: Point) {
        self.end_x = to.x;
        self.end_y = to.y;
    }

    /// Min/max-normalized rectangle in screen coordinates.
    pub fn normalized(&self) -> Rect {
        Rect::new(
            self.start_x.min(self.end_x),
            self.start_y.min(self.end_y),
            (self.end_x - self.start_x).abs(),
            (self.end_y - self.start_y).abs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_box_normalizes_any_drag_direction() {
        let mut crop = CropBox::anchored(Point::new(300.0, 200.0));
        crop.drag_to(Point::new(100.0, 250.0));

        assert_eq!(crop.normalized(), Rect::new(100.0, 200.0, 200.0, 50.0));
    }

    #[test]
    fn test_unmeasured_sizes() {
        assert!(!Size::new(0.0, 0.0).is_measured());
        assert!(!Size::new(100.0, 0.0).is_measured());
        assert!(!Size::new(f64::NAN, 10.0).is_measured());
        assert!(Size::new(1.0, 1.0).is_measured());
    }

    #[test]
    fn test_min_extent_and_output_dimensions() {
        let rect = Rect::new(5.0, 5.0, 0.2, 0.0).with_min_extent();
        assert_eq!(rect.width, 1.0);
        assert_eq!(rect.height, 1.0);
        assert_eq!(rect.output_dimensions(), (1, 1));

        assert_eq!(Rect::new(0.0, 0.0, 99.5, 10.4).output_dimensions(), (100, 10));
    }
}
