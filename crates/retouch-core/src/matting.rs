//! Chroma-key background removal.
//!
//! Two steps:
//!
//! 1. **Detect** the background from the first row: the top-left pixel is the
//!    primary color; the first pixel further along the row that differs from
//!    it by more than the tolerance on any channel is a secondary color (the
//!    other tone of a checkerboard transparency placeholder).
//! 2. **Key out** every pixel whose Euclidean RGB distance to any detected
//!    color is below the tolerance, by setting its alpha to 0. Other pixels
//!    keep their alpha.
//!
//! The tolerance is compared directly with the RGB distance (range 0 to
//! about 441), so a 0-100 slider only spans the lower part of that range.
//! Interior pixels matching the border color are removed too.

use serde::{Deserialize, Serialize};

use crate::decode::{DecodedImage, CHANNELS};

/// Background colors sampled from an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundColors {
    pub primary: [u8; 3],
    pub secondary: Option<[u8; 3]>,
    pub tolerance: f64,
}

impl BackgroundColors {
    /// Sample the background of `image`. `None` for an empty image.
    pub fn detect(image: &DecodedImage, tolerance: f64) -> Option<Self> {
        if image.is_empty() || !image.is_consistent() {
            return None;
        }

        let row = &image.pixels[..image.width as usize * CHANNELS];
        let primary = rgb(&row[..CHANNELS]);
        let secondary = row
            .chunks_exact(CHANNELS)
            .skip(1)
            .map(rgb)
            .find(|candidate| {
                primary
                    .iter()
                    .zip(candidate)
                    .any(|(&a, &b)| (a as f64 - b as f64).abs() > tolerance)
            });

        Some(Self {
            primary,
            secondary,
            tolerance,
        })
    }

    /// Whether `color` counts as background.
    #[inline]
    pub fn matches(&self, color: [u8; 3]) -> bool {
        let near = |bg: [u8; 3]| distance(bg, color) < self.tolerance;
        near(self.primary) || self.secondary.is_some_and(near)
    }

    /// Set alpha to 0 on every background pixel. Returns how many pixels
    /// were keyed out.
    pub fn apply(&self, pixels: &mut [u8]) -> usize {
        let mut removed = 0;
        for px in pixels.chunks_exact_mut(CHANNELS) {
            if self.matches(rgb(px)) {
                px[3] = 0;
                removed += 1;
            }
        }
        removed
    }
}

#[inline]
fn rgb(px: &[u8]) -> [u8; 3] {
    [px[0], px[1], px[2]]
}

/// Euclidean distance between two RGB colors.
#[inline]
pub fn distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Remove the sampled background from a copy of `image`.
pub fn remove_background(image: &DecodedImage, tolerance: f64) -> DecodedImage {
    let mut output = image.clone();
    if let Some(colors) = BackgroundColors::detect(image, tolerance) {
        let removed = colors.apply(&mut output.pixels);
        log::debug!(
            "matting: keyed out {removed} of {} pixels (secondary color: {})",
            image.pixel_count(),
            colors.secondary.is_some()
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;

    fn bordered(size: u32, border: [u8; 4], interior: [u8; 4]) -> DecodedImage {
        let mut img = DecodedImage::filled(size, size, interior);
        for y in 0..size {
            for x in 0..size {
                if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                    img.write_pixel(x, y, border).unwrap();
                }
            }
        }
        img
    }

    #[test]
    fn test_synthetic_border_is_removed() {
        let img = bordered(4, [10, 10, 10, 255], [200, 50, 50, 255]);
        let out = remove_background(&img, 30.0);

        for y in 0..4 {
            for x in 0..4 {
                let alpha = out.read_pixel(x, y).unwrap()[3];
                if x == 0 || y == 0 || x == 3 || y == 3 {
                    assert_eq!(alpha, 0, "border pixel ({x}, {y})");
                } else {
                    assert_eq!(alpha, 255, "interior pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_detect_single_color() {
        let img = bordered(4, [10, 10, 10, 255], [200, 50, 50, 255]);
        let colors = BackgroundColors::detect(&img, 30.0).unwrap();
        assert_eq!(colors.primary, [10, 10, 10]);
        assert_eq!(colors.secondary, None);
    }

    #[test]
    fn test_detect_checkerboard_second_tone() {
        let mut img = DecodedImage::filled(6, 2, [255, 255, 255, 255]);
        for x in [1, 3, 5] {
            img.write_pixel(x, 0, [204, 204, 204, 255]).unwrap();
        }
        img.write_pixel(2, 1, [0, 0, 200, 255]).unwrap();

        let colors = BackgroundColors::detect(&img, 20.0).unwrap();
        assert_eq!(colors.secondary, Some([204, 204, 204]));

        let out = remove_background(&img, 20.0);
        assert_eq!(out.read_pixel(0, 0).unwrap()[3], 0);
        assert_eq!(out.read_pixel(1, 0).unwrap()[3], 0);
        assert_eq!(out.read_pixel(2, 1).unwrap()[3], 255);
    }

    #[test]
    fn test_secondary_needs_per_channel_difference_above_tolerance() {
        let mut img = DecodedImage::filled(3, 1, [100, 100, 100, 255]);
        // Differs by exactly the tolerance: not a second color.
        img.write_pixel(1, 0, [120, 100, 100, 255]).unwrap();
        img.write_pixel(2, 0, [121, 100, 100, 255]).unwrap();

        let colors = BackgroundColors::detect(&img, 20.0).unwrap();
        assert_eq!(colors.secondary, Some([121, 100, 100]));
    }

    #[test]
    fn test_distance_threshold_is_strict() {
        let colors = BackgroundColors {
            primary: [0, 0, 0],
            secondary: None,
            tolerance: 5.0,
        };
        assert!(colors.matches([3, 0, 0]));
        assert!(!colors.matches([3, 4, 0])); // distance exactly 5
    }

    #[test]
    fn test_keeps_existing_alpha_of_foreground() {
        let mut img = DecodedImage::filled(2, 1, [0, 0, 0, 255]);
        img.write_pixel(1, 0, [250, 250, 250, 90]).unwrap();
        let out = remove_background(&img, 20.0);
        assert_eq!(out.read_pixel(1, 0), Some([250, 250, 250, 90]));
        assert_eq!(out.read_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_interior_duplicates_are_removed_too() {
        let mut img = bordered(5, [10, 10, 10, 255], [200, 50, 50, 255]);
        img.write_pixel(2, 2, [12, 12, 12, 255]).unwrap();
        let out = remove_background(&img, 30.0);
        assert_eq!(out.read_pixel(2, 2).unwrap()[3], 0);
    }

    #[test]
    fn test_zero_tolerance_removes_nothing() {
        let img = DecodedImage::filled(3, 3, [7, 7, 7, 255]);
        assert_eq!(remove_background(&img, 0.0), img);
    }

    #[test]
    fn test_empty_image() {
        let img = DecodedImage::new(0, 0, vec![]);
        assert!(BackgroundColors::detect(&img, 20.0).is_none());
        assert_eq!(remove_background(&img, 20.0), img);
    }
}
