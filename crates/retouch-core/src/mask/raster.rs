//! The mask buffer and its exports.

use std::borrow::Cow;

use super::{segment_coverage, OVERLAY_ALPHA, OVERLAY_RGB, PAINTED, UNTOUCHED};
use crate::decode::{DecodedImage, CHANNELS};
use crate::encode::{encode_png, EncodeError};
use crate::geometry::Point;
use crate::surface::{RasterSurface, SurfaceError};

/// Per-pixel brush coverage for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRaster {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl MaskRaster {
    /// An empty mask for a `width`x`height` image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Raw coverage, one byte per pixel.
    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    pub fn is_painted(&self, x: u32, y: u32) -> bool {
        self.index(x, y).is_some_and(|i| self.coverage[i] > 0)
    }

    pub fn painted_count(&self) -> usize {
        self.coverage.iter().filter(|&&a| a > 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&a| a == 0)
    }

    /// Erase everything.
    pub fn clear(&mut self) {
        self.coverage.fill(0);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Paint one stroke segment of diameter `width` from `from` to `to`,
    /// in mask pixel coordinates.
    ///
    /// Round caps and joins; coverage only ever grows.
    pub fn paint_segment(&mut self, from: Point, to: Point, width: f64) {
        if !(width.is_finite() && width > 0.0)
            || !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite())
        {
            return;
        }
        let radius = width / 2.0;
        let reach = radius + 1.0;

        // Only visit the segment's bounding box.
        let span = |lo: f64, hi: f64, max: u32| -> (u32, u32) {
            let start = (lo - reach).floor().max(0.0);
            let end = (hi + reach).ceil().min(max as f64);
            (start as u32, end.max(start) as u32)
        };
        let (x0, x1) = span(from.x.min(to.x), from.x.max(to.x), self.width);
        let (y0, y1) = span(from.y.min(to.y), from.y.max(to.y), self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let cover = segment_coverage(center, from, to, radius);
                if cover <= 0.0 {
                    continue;
                }
                let alpha = (cover * OVERLAY_ALPHA as f64).round() as u8;
                let i = y as usize * self.width as usize + x as usize;
                self.coverage[i] = self.coverage[i].max(alpha);
            }
        }
    }

    /// Translucent preview of the painted region.
    pub fn overlay_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.coverage.len() * CHANNELS);
        for &alpha in &self.coverage {
            out.extend_from_slice(&[OVERLAY_RGB[0], OVERLAY_RGB[1], OVERLAY_RGB[2], alpha]);
        }
        out
    }

    /// The two-tone inpainting mask: painted black, untouched white, always
    /// opaque.
    pub fn export(&self) -> DecodedImage {
        let mut pixels = Vec::with_capacity(self.coverage.len() * CHANNELS);
        for &alpha in &self.coverage {
            pixels.extend_from_slice(if alpha > 0 { &PAINTED } else { &UNTOUCHED });
        }
        DecodedImage::new(self.width, self.height, pixels)
    }

    /// [`export`](Self::export), PNG-encoded.
    pub fn export_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mask = self.export();
        encode_png(&mask.pixels, mask.width, mask.height)
    }
}

impl RasterSurface for MaskRaster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        Some([OVERLAY_RGB[0], OVERLAY_RGB[1], OVERLAY_RGB[2], self.coverage[i]])
    }

    /// Only the alpha channel is stored.
    fn write_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), SurfaceError> {
        let i = self.index(x, y).ok_or(SurfaceError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.coverage[i] = rgba[3];
        Ok(())
    }

    fn pixels(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.overlay_rgba())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    #[test]
    fn test_new_mask_is_blank() {
        let mask = MaskRaster::new(8, 4);
        assert!(mask.is_blank());
        assert_eq!(mask.coverage().len(), 32);
    }

    #[test]
    fn test_segment_paints_capsule() {
        let mut mask = MaskRaster::new(20, 10);
        mask.paint_segment(Point::new(4.0, 5.0), Point::new(16.0, 5.0), 4.0);

        assert!(mask.is_painted(10, 4));
        assert!(mask.is_painted(3, 5));
        assert!(!mask.is_painted(10, 0));
        assert!(!mask.is_painted(0, 5));
        assert_eq!(mask.coverage()[5 * 20 + 10], OVERLAY_ALPHA);
    }

    #[test]
    fn test_zero_length_segment_paints_dot() {
        let mut mask = MaskRaster::new(10, 10);
        mask.paint_segment(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 2.0);
        assert!(mask.is_painted(4, 4));
        assert!(mask.is_painted(5, 5));
        assert!(!mask.is_painted(8, 8));
    }

    #[test]
    fn test_overlapping_strokes_do_not_accumulate() {
        let mut mask = MaskRaster::new(10, 10);
        mask.paint_segment(Point::new(0.0, 5.0), Point::new(10.0, 5.0), 4.0);
        mask.paint_segment(Point::new(5.0, 0.0), Point::new(5.0, 10.0), 4.0);
        assert_eq!(mask.coverage().iter().max(), Some(&OVERLAY_ALPHA));
    }

    #[test]
    fn test_segment_outside_is_clipped() {
        let mut mask = MaskRaster::new(10, 10);
        mask.paint_segment(Point::new(-50.0, -50.0), Point::new(-40.0, -40.0), 5.0);
        assert!(mask.is_blank());

        mask.paint_segment(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), 2.0);
        assert!(mask.is_painted(0, 5));
        assert!(mask.is_painted(9, 5));
    }

    #[test]
    fn test_invalid_width_paints_nothing() {
        let mut mask = MaskRaster::new(10, 10);
        mask.paint_segment(Point::new(1.0, 1.0), Point::new(8.0, 8.0), 0.0);
        mask.paint_segment(Point::new(1.0, 1.0), Point::new(8.0, 8.0), f64::NAN);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_clear() {
        let mut mask = MaskRaster::new(10, 10);
        mask.paint_segment(Point::new(1.0, 1.0), Point::new(8.0, 8.0), 3.0);
        assert!(!mask.is_blank());
        mask.clear();
        assert!(mask.is_blank());
    }

    #[test]
    fn test_export_contract() {
        let mut mask = MaskRaster::new(6, 6);
        mask.write_pixel(1, 1, [0, 0, 0, 1]).unwrap();
        mask.write_pixel(4, 2, [0, 0, 0, 255]).unwrap();

        let export = mask.export();
        assert_eq!((export.width, export.height), (6, 6));
        for y in 0..6 {
            for x in 0..6 {
                let expected = if (x, y) == (1, 1) || (x, y) == (4, 2) {
                    PAINTED
                } else {
                    UNTOUCHED
                };
                assert_eq!(export.read_pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_export_of_stroke_is_strictly_two_tone() {
        let mut mask = MaskRaster::new(32, 32);
        mask.paint_segment(Point::new(3.0, 3.0), Point::new(28.0, 20.0), 7.3);

        let export = mask.export();
        for px in export.pixels.chunks_exact(4) {
            assert!(px == PAINTED || px == UNTOUCHED);
        }
        let black = export.pixels.chunks_exact(4).filter(|p| *p == PAINTED).count();
        assert_eq!(black, mask.painted_count());
    }

    #[test]
    fn test_export_png_decodes_to_same_mask() {
        let mut mask = MaskRaster::new(9, 7);
        mask.paint_segment(Point::new(2.0, 2.0), Point::new(6.0, 5.0), 2.0);

        let png = mask.export_png().unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded, mask.export());
    }

    #[test]
    fn test_overlay_surface() {
        let mut mask = MaskRaster::new(2, 1);
        mask.write_pixel(1, 0, [9, 9, 9, 77]).unwrap();
        assert_eq!(mask.read_pixel(0, 0), Some([250, 204, 21, 0]));
        assert_eq!(mask.read_pixel(1, 0), Some([250, 204, 21, 77]));
        assert_eq!(mask.pixels().as_ref(), mask.overlay_rgba().as_slice());
        assert!(mask.write_pixel(2, 0, [0; 4]).is_err());
    }
}
