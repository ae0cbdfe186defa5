//! Freehand mask painting over the viewed image.

use crate::geometry::{Point, Rect};
use crate::mask::MaskRaster;
use crate::surface::RasterSurface;

/// Painting state for one masking session.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSession {
    raster: MaskRaster,
    brush_size: f64,
    last_point: Option<Point>,
}

impl MaskSession {
    /// A blank mask matching a `width`x`height` image.
    pub fn new(width: u32, height: u32, brush_size: f64) -> Self {
        Self {
            raster: MaskRaster::new(width, height),
            brush_size,
            last_point: None,
        }
    }

    pub fn raster(&self) -> &MaskRaster {
        &self.raster
    }

    pub fn brush_size(&self) -> f64 {
        self.brush_size
    }

    /// Brush diameter in screen pixels. Non-positive or non-finite sizes
    /// are ignored.
    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.brush_size = size;
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    /// Map a pointer position to mask pixels, given the screen rectangle
    /// the mask is displayed in.
    pub fn to_mask_coords(&self, client: Point, element: Rect) -> Option<Point> {
        if !(element.width > 0.0 && element.height > 0.0) {
            return None;
        }
        Some(Point::new(
            (client.x - element.x) / element.width * self.raster.width() as f64,
            (client.y - element.y) / element.height * self.raster.height() as f64,
        ))
    }

    /// Start a stroke. Nothing is painted until the pointer moves.
    pub fn pointer_down(&mut self, at: Point) {
        self.last_point = Some(at);
    }

    /// Paint from the previous sample to `at`.
    ///
    /// The stroke is `brush_size / zoom` mask pixels wide so that the brush
    /// looks the same on screen at every zoom.
    pub fn pointer_move(&mut self, at: Point, zoom: f64) -> bool {
        let Some(from) = self.last_point else {
            return false;
        };
        if zoom.is_finite() && zoom > 0.0 {
            self.raster.paint_segment(from, at, self.brush_size / zoom);
        }
        self.last_point = Some(at);
        true
    }

    pub fn pointer_up(&mut self) {
        self.last_point = None;
    }

    pub fn clear(&mut self) {
        self.raster.clear();
        self.last_point = None;
    }
}
