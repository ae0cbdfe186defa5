//! Raster surfaces: the pixel-buffer seam between geometry and rendering.
//!
//! Everything the compositor draws goes through [`RasterSurface`], so the
//! pipeline only needs width, height, per-pixel access and sub-rectangle
//! drawing from whatever holds the pixels.

use std::borrow::Cow;

use thiserror::Error;

use crate::decode::{DecodedImage, CHANNELS};
use crate::geometry::Rect;
use crate::transform::{sample, InterpolationFilter};

/// Largest side a surface may have.
pub const MAX_SURFACE_SIDE: u32 = 32_767;

/// Largest pixel count a surface may have.
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Errors raised while acquiring or drawing into a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface could not be created at the requested size.
    #[error("Drawing surface unavailable for {width}x{height}")]
    Unavailable { width: u32, height: u32 },

    /// A write addressed a pixel outside the surface.
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The backing buffer does not match the surface dimensions.
    #[error("Surface buffer has {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// A rectangular grid of straight-alpha RGBA pixels.
pub trait RasterSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// The pixel at `(x, y)`, or `None` outside the surface.
    fn read_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]>;

    fn write_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), SurfaceError>;

    /// All pixels, row-major RGBA.
    fn pixels(&self) -> Cow<'_, [u8]> {
        let mut out = Vec::with_capacity(self.width() as usize * self.height() as usize * CHANNELS);
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.extend_from_slice(&self.read_pixel(x, y).unwrap_or_default());
            }
        }
        Cow::Owned(out)
    }

    /// Resample `rect` of `src` onto the whole of this surface, passing each
    /// pixel through `filter`.
    ///
    /// `rect` is fractional and may extend past `src`; uncovered areas come
    /// out transparent. Pixel centers are mapped to pixel centers, so an
    /// integer-aligned rectangle of the destination's size copies exactly.
    fn draw_sub_rect<S, F>(
        &mut self,
        src: &S,
        rect: Rect,
        interpolation: InterpolationFilter,
        filter: F,
    ) -> Result<(), SurfaceError>
    where
        Self: Sized,
        S: RasterSurface + ?Sized,
        F: Fn([u8; 4]) -> [u8; 4],
    {
        let (dst_w, dst_h) = (self.width(), self.height());
        if dst_w == 0 || dst_h == 0 {
            return Ok(());
        }

        let step_x = rect.width / dst_w as f64;
        let step_y = rect.height / dst_h as f64;

        for dy in 0..dst_h {
            let sy = rect.y + (dy as f64 + 0.5) * step_y - 0.5;
            for dx in 0..dst_w {
                let sx = rect.x + (dx as f64 + 0.5) * step_x - 0.5;
                let pixel = sample(src, sx, sy, interpolation);
                self.write_pixel(dx, dy, filter(pixel))?;
            }
        }
        Ok(())
    }
}

/// Allocate a transparent surface, refusing sizes no drawing backend can
/// hold.
pub fn allocate_surface(width: u32, height: u32) -> Result<DecodedImage, SurfaceError> {
    let area = width as u64 * height as u64;
    if width == 0
        || height == 0
        || width > MAX_SURFACE_SIDE
        || height > MAX_SURFACE_SIDE
        || area > MAX_SURFACE_AREA
    {
        return Err(SurfaceError::Unavailable { width, height });
    }
    Ok(DecodedImage::transparent(width, height))
}

impl RasterSurface for DecodedImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn read_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.pixels.get(idx..idx + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    #[inline]
    fn write_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), SurfaceError> {
        if x >= self.width || y >= self.height {
            return Err(SurfaceError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.pixel_count() * CHANNELS;
        let actual = self.pixels.len();
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        match self.pixels.get_mut(idx..idx + CHANNELS) {
            Some(px) => {
                px.copy_from_slice(&rgba);
                Ok(())
            }
            None => Err(SurfaceError::BufferMismatch { expected, actual }),
        }
    }

    fn pixels(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> DecodedImage {
        let mut img = DecodedImage::transparent(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as u8;
                img.write_pixel(x, y, [v, v, v, 255]).unwrap();
            }
        }
        img
    }

    #[test]
    fn test_read_write_roundtrip() {
        let mut img = DecodedImage::transparent(3, 2);
        img.write_pixel(2, 1, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.read_pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.read_pixel(3, 1), None);
    }

    #[test]
    fn test_write_out_of_bounds() {
        let mut img = DecodedImage::transparent(3, 2);
        let err = img.write_pixel(0, 2, [0; 4]).unwrap_err();
        assert!(matches!(err, SurfaceError::OutOfBounds { y: 2, .. }));
    }

    #[test]
    fn test_write_into_short_buffer() {
        let mut img = DecodedImage {
            width: 2,
            height: 2,
            pixels: vec![0; 8],
        };
        let err = img.write_pixel(1, 1, [0; 4]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::BufferMismatch {
                expected: 16,
                actual: 8
            }
        );
    }

    #[test]
    fn test_allocate_rejects_huge_and_empty() {
        assert!(allocate_surface(10, 10).is_ok());
        assert!(matches!(allocate_surface(0, 10), Err(SurfaceError::Unavailable { .. })));
        assert!(allocate_surface(MAX_SURFACE_SIDE + 1, 1).is_err());
        assert!(allocate_surface(20_000, 20_000).is_err());
    }

    #[test]
    fn test_draw_sub_rect_integer_copy_is_exact() {
        let src = numbered(6, 5);
        let mut dst = DecodedImage::transparent(3, 2);
        dst.draw_sub_rect(&src, Rect::new(2.0, 1.0, 3.0, 2.0), InterpolationFilter::Bilinear, |p| p)
            .unwrap();

        assert_eq!(dst.read_pixel(0, 0), Some([8, 8, 8, 255]));
        assert_eq!(dst.read_pixel(2, 1), Some([16, 16, 16, 255]));
    }

    #[test]
    fn test_draw_sub_rect_outside_source_is_transparent() {
        let src = DecodedImage::filled(4, 4, [255, 0, 0, 255]);
        let mut dst = DecodedImage::filled(2, 1, [9, 9, 9, 9]);
        dst.draw_sub_rect(&src, Rect::new(3.0, 0.0, 2.0, 1.0), InterpolationFilter::Bilinear, |p| p)
            .unwrap();

        assert_eq!(dst.read_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(dst.read_pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_sub_rect_applies_filter() {
        let src = DecodedImage::filled(2, 2, [10, 20, 30, 255]);
        let mut dst = DecodedImage::transparent(2, 2);
        dst.draw_sub_rect(&src, Rect::new(0.0, 0.0, 2.0, 2.0), InterpolationFilter::Bilinear, |[r, g, b, a]| {
            [b, g, r, a]
        })
        .unwrap();
        assert_eq!(dst.read_pixel(1, 1), Some([30, 20, 10, 255]));
    }

    #[test]
    fn test_default_pixels_goes_through_read_pixel() {
        struct Checker;
        impl RasterSurface for Checker {
            fn width(&self) -> u32 {
                2
            }
            fn height(&self) -> u32 {
                1
            }
            fn read_pixel(&self, x: u32, _y: u32) -> Option<[u8; 4]> {
                Some(if x == 0 { [0, 0, 0, 255] } else { [255, 255, 255, 255] })
            }
            fn write_pixel(&mut self, _x: u32, _y: u32, _rgba: [u8; 4]) -> Result<(), SurfaceError> {
                Ok(())
            }
        }

        assert_eq!(Checker.pixels().as_ref(), &[0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
