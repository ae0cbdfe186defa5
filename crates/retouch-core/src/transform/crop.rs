//! Region extraction.
//!
//! Draws a fractional rectangle of a raster into a new raster sized to the
//! rectangle (rounded, at least 1x1), filtering colors on the way. This is
//! the one place where the crop, the output size and the color filter meet.

use super::InterpolationFilter;
use crate::decode::DecodedImage;
use crate::filter::FilterState;
use crate::geometry::Rect;
use crate::surface::{allocate_surface, RasterSurface, SurfaceError};

/// Extract `rect` of `source` into a new raster, applying `filter`.
///
/// # Behavior
///
/// - Output dimensions are `rect.output_dimensions()`
/// - Parts of `rect` outside `source` come out transparent
/// - An integer-aligned rectangle copies pixels exactly
///
/// # Example
///
/// ```ignore
/// let region = extract_region(&image, Rect::new(10.0, 10.0, 64.0, 48.0),
///     InterpolationFilter::Bilinear, &FilterState::default())?;
/// assert_eq!((region.width, region.height), (64, 48));
/// ```
pub fn extract_region<S>(
    source: &S,
    rect: Rect,
    interpolation: InterpolationFilter,
    filter: &FilterState,
) -> Result<DecodedImage, SurfaceError>
where
    S: RasterSurface + ?Sized,
{
    let (out_width, out_height) = rect.output_dimensions();
    let mut output = allocate_surface(out_width, out_height)?;
    output.draw_sub_rect(source, rect, interpolation, |px| filter.apply_pixel(px))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKind;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn extract(img: &DecodedImage, rect: Rect) -> DecodedImage {
        extract_region(img, rect, InterpolationFilter::Bilinear, &FilterState::default()).unwrap()
    }

    #[test]
    fn test_full_region_is_copy() {
        let img = test_image(100, 100);
        assert_eq!(extract(&img, Rect::new(0.0, 0.0, 100.0, 100.0)), img);
    }

    #[test]
    fn test_center_region_pixel_values_preserved() {
        let img = test_image(10, 10);
        let result = extract(&img, Rect::new(2.0, 2.0, 6.0, 6.0));

        assert_eq!(result.width, 6);
        assert_eq!(result.height, 6);
        // Value at (2, 2) = 2 * 10 + 2 = 22
        assert_eq!(result.pixels[0], 22);
        // Value at (7, 7) = 77
        assert_eq!(result.read_pixel(5, 5), Some([77, 77, 77, 255]));
    }

    #[test]
    fn test_rectangular_region() {
        let img = test_image(200, 100);
        let result = extract(&img, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!((result.width, result.height), (100, 50));
    }

    #[test]
    fn test_fractional_size_rounds() {
        let img = test_image(20, 20);
        let result = extract(&img, Rect::new(0.3, 0.3, 10.6, 4.4));
        assert_eq!((result.width, result.height), (11, 4));
    }

    #[test]
    fn test_minimum_dimension() {
        let img = test_image(10, 10);
        let result = extract(&img, Rect::new(5.0, 5.0, 0.0, 0.2));
        assert_eq!((result.width, result.height), (1, 1));
    }

    #[test]
    fn test_region_past_edge_is_transparent() {
        let img = test_image(10, 10);
        let result = extract(&img, Rect::new(8.0, 0.0, 4.0, 1.0));

        assert_eq!(result.read_pixel(1, 0), Some([9, 9, 9, 255]));
        assert_eq!(result.read_pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(result.read_pixel(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_filter_applied_during_draw() {
        let img = DecodedImage::filled(4, 4, [200, 40, 10, 255]);
        let gray = FilterState::new(FilterKind::Grayscale, 100);
        let result =
            extract_region(&img, Rect::new(0.0, 0.0, 4.0, 4.0), InterpolationFilter::Bilinear, &gray)
                .unwrap();

        let [r, g, b, a] = result.read_pixel(2, 2).unwrap();
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
        // Source untouched.
        assert_eq!(img.read_pixel(2, 2), Some([200, 40, 10, 255]));
    }
}
