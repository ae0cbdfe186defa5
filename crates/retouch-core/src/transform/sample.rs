//! Point sampling with bilinear and Lanczos3 interpolation.
//!
//! Coordinates are in pixel-index space: `(0.0, 0.0)` is the center of the
//! top-left pixel. Pixel `i` covers `[i - 0.5, i + 0.5)`; outside the
//! covered area every sampler returns transparent black, inside it the edge
//! pixels are extended.
//!
//! Interpolation weights are applied to alpha-premultiplied values so that
//! transparent neighbours do not bleed their color into opaque ones.

use super::InterpolationFilter;
use crate::surface::RasterSurface;

/// Sample `src` at `(x, y)` with the given filter.
#[inline]
pub fn sample<S>(src: &S, x: f64, y: f64, filter: InterpolationFilter) -> [u8; 4]
where
    S: RasterSurface + ?Sized,
{
    match filter {
        InterpolationFilter::Bilinear => sample_bilinear(src, x, y),
        InterpolationFilter::Lanczos3 => sample_lanczos3(src, x, y),
    }
}

#[inline]
fn covers<S: RasterSurface + ?Sized>(src: &S, x: f64, y: f64) -> bool {
    let (w, h) = (src.width() as f64, src.height() as f64);
    // Written positively so NaN falls outside.
    x >= -0.5 && x < w - 0.5 && y >= -0.5 && y < h - 0.5
}

/// Accumulates premultiplied RGBA.
#[derive(Default)]
struct Accumulator {
    rgb: [f64; 3],
    alpha: f64,
}

impl Accumulator {
    #[inline]
    fn add(&mut self, px: [u8; 4], weight: f64) {
        let a = px[3] as f64 * weight;
        self.rgb[0] += px[0] as f64 * a;
        self.rgb[1] += px[1] as f64 * a;
        self.rgb[2] += px[2] as f64 * a;
        self.alpha += a;
    }

    #[inline]
    fn finish(self, weight_sum: f64) -> [u8; 4] {
        if self.alpha <= 0.0 || weight_sum <= 0.0 {
            return [0, 0, 0, 0];
        }
        let channel = |v: f64| (v / self.alpha).clamp(0.0, 255.0).round() as u8;
        [
            channel(self.rgb[0]),
            channel(self.rgb[1]),
            channel(self.rgb[2]),
            (self.alpha / weight_sum).clamp(0.0, 255.0).round() as u8,
        ]
    }
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance.
pub fn sample_bilinear<S>(src: &S, x: f64, y: f64) -> [u8; 4]
where
    S: RasterSurface + ?Sized,
{
    if !covers(src, x, y) {
        return [0, 0, 0, 0];
    }

    let (max_x, max_y) = (src.width() - 1, src.height() - 1);
    let x = x.clamp(0.0, max_x as f64);
    let y = y.clamp(0.0, max_y as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let mut acc = Accumulator::default();
    for (px, py, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x1, y0, fx * (1.0 - fy)),
        (x0, y1, (1.0 - fx) * fy),
        (x1, y1, fx * fy),
    ] {
        if weight > 0.0 {
            acc.add(src.read_pixel(px, py).unwrap_or_default(), weight);
        }
    }
    acc.finish(1.0)
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels, providing
/// higher quality results especially for sharp edges. Within three pixels
/// of the border it falls back to bilinear.
pub fn sample_lanczos3<S>(src: &S, x: f64, y: f64) -> [u8; 4]
where
    S: RasterSurface + ?Sized,
{
    let (w, h) = (src.width() as i64, src.height() as i64);

    if !(x >= 2.0 && x < (w - 3) as f64 && y >= 2.0 && y < (h - 3) as f64) {
        return sample_bilinear(src, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut acc = Accumulator::default();
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            if let Some(pixel) = src.read_pixel(px as u32, py as u32) {
                acc.add(pixel, weight);
                weight_sum += weight;
            }
        }
    }

    acc.finish(weight_sum)
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 8) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_bilinear_on_pixel_center_is_exact() {
        let img = gradient(10, 10);
        assert_eq!(sample_bilinear(&img, 3.0, 4.0), [56, 56, 56, 255]);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let img = gradient(10, 10);
        // Halfway between 56 and 64.
        assert_eq!(sample_bilinear(&img, 3.5, 4.0), [60, 60, 60, 255]);
    }

    #[test]
    fn test_bilinear_edge_extends_then_cuts() {
        let img = DecodedImage::filled(4, 4, [200, 0, 0, 255]);
        assert_eq!(sample_bilinear(&img, -0.4, 0.0), [200, 0, 0, 255]);
        assert_eq!(sample_bilinear(&img, -0.6, 0.0), [0, 0, 0, 0]);
        assert_eq!(sample_bilinear(&img, 3.49, 3.0), [200, 0, 0, 255]);
        assert_eq!(sample_bilinear(&img, 3.5, 3.0), [0, 0, 0, 0]);
        assert_eq!(sample_bilinear(&img, f64::NAN, 0.0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_bilinear_does_not_bleed_transparent_color() {
        let mut img = DecodedImage::filled(2, 1, [255, 0, 0, 255]);
        // Right pixel: transparent green.
        img.pixels[4..8].copy_from_slice(&[0, 255, 0, 0]);

        let [r, g, b, a] = sample_bilinear(&img, 0.5, 0.0);
        assert_eq!((r, g, b), (255, 0, 0));
        assert_eq!(a, 128);
    }

    #[test]
    fn test_lanczos_matches_center_and_falls_back() {
        let img = gradient(20, 20);
        assert_eq!(sample_lanczos3(&img, 10.0, 10.0), [160, 160, 160, 255]);
        assert_eq!(sample_lanczos3(&img, 0.5, 0.0), sample_bilinear(&img, 0.5, 0.0));
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        assert!((lanczos_weight(0.0, 3.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        assert!(lanczos_weight(3.0, 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        assert!((lanczos_weight(1.5, 3.0) - lanczos_weight(-1.5, 3.0)).abs() < 1e-10);
    }

    #[test]
    fn test_single_pixel_image() {
        let img = DecodedImage::filled(1, 1, [1, 2, 3, 255]);
        assert_eq!(sample(&img, 0.2, -0.2, InterpolationFilter::Lanczos3), [1, 2, 3, 255]);
    }
}
