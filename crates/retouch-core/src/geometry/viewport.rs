//! Screen-space placement of the transformed image and the inverse mapping
//! used at apply time.

use super::{CropBox, Point, Rect, Size};

/// The container the preview is drawn in, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Screen position of the container's top-left corner.
    pub origin: Point,
    /// Measured size. `0x0` until the container is laid out.
    pub size: Size,
}

impl Viewport {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// A viewport at the screen origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(Point::ORIGIN, Size::new(width, height))
    }

    pub fn is_measured(&self) -> bool {
        self.size.is_measured()
    }

    /// Screen rectangle covered by content of `natural` size drawn centered,
    /// scaled by `zoom` and shifted by `pan`.
    pub fn display_rect(&self, natural: Size, zoom: f64, pan: Point) -> Rect {
        let displayed = natural.scale(zoom);
        Rect::new(
            self.origin.x + (self.size.width - displayed.width) / 2.0 + pan.x,
            self.origin.y + (self.size.height - displayed.height) / 2.0 + pan.y,
            displayed.width,
            displayed.height,
        )
    }
}

fn usable_zoom(zoom: f64) -> bool {
    zoom.is_finite() && zoom > 0.0
}

/// Zoom that fits `content` inside `container`, scaled by `margin`.
///
/// With `side_by_side` the content width is doubled so that a before/after
/// pair fits next to each other. Returns `None` when the container has no
/// measured size; a ratio that is not a positive finite number falls back to
/// `1.0`.
pub fn fit_zoom(container: Size, content: Size, side_by_side: bool, margin: f64) -> Option<f64> {
    if !container.is_measured() {
        return None;
    }
    let content_width = if side_by_side {
        content.width * 2.0
    } else {
        content.width
    };
    let zoom = (container.width / content_width).min(container.height / content.height) * margin;
    Some(if usable_zoom(zoom) { zoom } else { 1.0 })
}

/// Zoom that makes `content` exactly as tall as `container`.
///
/// Only the container height has to be measured.
pub fn fit_to_height(container: Size, content: Size) -> Option<f64> {
    if !(container.height.is_finite() && container.height > 0.0) {
        return None;
    }
    let zoom = container.height / content.height;
    Some(if usable_zoom(zoom) { zoom } else { 1.0 })
}

/// Resolve a crop drawn on screen to a rectangle in transformed space.
///
/// `natural` is the transformed bounding box, displayed 1:1 at zoom 1.
/// The result is at least one pixel on each side. It is not clamped to the
/// image: parts of a crop outside the image render transparent.
///
/// Returns `None` when the viewport or image has no size, or the zoom is
/// not usable.
pub fn map_crop_to_source(
    viewport: &Viewport,
    natural: Size,
    zoom: f64,
    pan: Point,
    crop: &CropBox,
) -> Option<Rect> {
    if !viewport.is_measured() || !natural.is_measured() || !usable_zoom(zoom) {
        return None;
    }

    let display = viewport.display_rect(natural, zoom, pan);
    let selection = crop.normalized();
    let to_source_x = natural.width / display.width;
    let to_source_y = natural.height / display.height;

    let rect = Rect::new(
        (selection.x - display.x) * to_source_x,
        (selection.y - display.y) * to_source_y,
        selection.width * to_source_x,
        selection.height * to_source_y,
    );
    Some(rect.with_min_extent())
}

/// The part of the transformed image currently visible in the viewport.
///
/// `container / zoom` in size, centered on the image center and offset by
/// `-pan / zoom`.
pub fn visible_source_rect(viewport: &Viewport, natural: Size, zoom: f64, pan: Point) -> Option<Rect> {
    if !viewport.is_measured() || !natural.is_measured() || !usable_zoom(zoom) {
        return None;
    }

    let width = viewport.size.width / zoom;
    let height = viewport.size.height / zoom;
    let rect = Rect::new(
        (natural.width - width) / 2.0 - pan.x / zoom,
        (natural.height - height) / 2.0 - pan.y / zoom,
        width,
        height,
    );
    Some(rect.with_min_extent())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_zoom_uses_tighter_axis() {
        let zoom = fit_zoom(Size::new(800.0, 600.0), Size::new(1600.0, 600.0), false, 0.95);
        assert!(approx(zoom.unwrap(), 0.5 * 0.95));
    }

    #[test]
    fn test_fit_zoom_side_by_side_doubles_width() {
        let zoom = fit_zoom(Size::new(800.0, 600.0), Size::new(400.0, 100.0), true, 1.0);
        assert!(approx(zoom.unwrap(), 1.0));
    }

    #[test]
    fn test_fit_zoom_unmeasured_container_is_noop() {
        assert_eq!(fit_zoom(Size::new(0.0, 0.0), Size::new(100.0, 100.0), false, 0.95), None);
        assert_eq!(fit_zoom(Size::new(500.0, 0.0), Size::new(100.0, 100.0), false, 0.95), None);
    }

    #[test]
    fn test_fit_zoom_degenerate_content_falls_back_to_one() {
        let zoom = fit_zoom(Size::new(800.0, 600.0), Size::new(0.0, 0.0), false, 0.95);
        assert_eq!(zoom, Some(1.0));
    }

    #[test]
    fn test_fit_to_height() {
        assert_eq!(fit_to_height(Size::new(10.0, 300.0), Size::new(900.0, 600.0)), Some(0.5));
        assert_eq!(fit_to_height(Size::new(10.0, 0.0), Size::new(900.0, 600.0)), None);
    }

    #[test]
    fn test_display_rect_centers_and_pans() {
        let viewport = Viewport::new(Point::new(10.0, 20.0), Size::new(800.0, 600.0));
        let rect = viewport.display_rect(Size::new(400.0, 200.0), 0.5, Point::new(5.0, -5.0));
        assert_eq!(rect, Rect::new(10.0 + 300.0 + 5.0, 20.0 + 250.0 - 5.0, 200.0, 100.0));
    }

    #[test]
    fn test_crop_over_whole_display_maps_to_whole_image() {
        let viewport = Viewport::sized(800.0, 600.0);
        let natural = Size::new(400.0, 200.0);
        let display = viewport.display_rect(natural, 2.0, Point::ORIGIN);
        let crop = CropBox {
            start_x: display.x,
            start_y: display.y,
            end_x: display.right(),
            end_y: display.bottom(),
        };

        let rect = map_crop_to_source(&viewport, natural, 2.0, Point::ORIGIN, &crop).unwrap();
        assert!(approx(rect.x, 0.0));
        assert!(approx(rect.y, 0.0));
        assert!(approx(rect.width, 400.0));
        assert!(approx(rect.height, 200.0));
    }

    #[test]
    fn test_crop_respects_viewport_origin_and_pan() {
        // Container at (100, 50); 200x100 image at zoom 1 sits at (100+100, 50+50),
        // panned by (20, 10).
        let viewport = Viewport::new(Point::new(100.0, 50.0), Size::new(400.0, 200.0));
        let natural = Size::new(200.0, 100.0);
        let pan = Point::new(20.0, 10.0);
        let crop = CropBox {
            start_x: 260.0,
            start_y: 140.0,
            end_x: 230.0,
            end_y: 120.0,
        };

        let rect = map_crop_to_source(&viewport, natural, 1.0, pan, &crop).unwrap();
        assert_eq!(rect, Rect::new(10.0, 10.0, 30.0, 20.0));
    }

    #[test]
    fn test_zero_area_crop_becomes_one_pixel() {
        let viewport = Viewport::sized(400.0, 400.0);
        let crop = CropBox::anchored(Point::new(200.0, 200.0));
        let rect = map_crop_to_source(&viewport, Size::new(100.0, 100.0), 1.0, Point::ORIGIN, &crop).unwrap();
        assert_eq!(rect.width, 1.0);
        assert_eq!(rect.height, 1.0);
        assert_eq!(rect.output_dimensions(), (1, 1));
    }

    #[test]
    fn test_crop_needs_measured_viewport() {
        let crop = CropBox::anchored(Point::new(1.0, 1.0));
        let unmeasured = Viewport::sized(0.0, 0.0);
        assert_eq!(map_crop_to_source(&unmeasured, Size::new(10.0, 10.0), 1.0, Point::ORIGIN, &crop), None);
    }

    #[test]
    fn test_visible_rect_at_zoom_one_without_pan() {
        let viewport = Viewport::sized(400.0, 300.0);
        let rect = visible_source_rect(&viewport, Size::new(1000.0, 500.0), 1.0, Point::ORIGIN).unwrap();
        assert_eq!(rect, Rect::new(300.0, 100.0, 400.0, 300.0));
    }

    #[test]
    fn test_visible_rect_pan_moves_opposite() {
        let viewport = Viewport::sized(400.0, 300.0);
        let rect = visible_source_rect(&viewport, Size::new(1000.0, 500.0), 2.0, Point::new(100.0, -50.0)).unwrap();
        assert!(approx(rect.width, 200.0));
        assert!(approx(rect.height, 150.0));
        assert!(approx(rect.x, 400.0 - 50.0));
        assert!(approx(rect.y, 175.0 + 25.0));
    }

    #[test]
    fn test_visible_rect_rejects_bad_zoom() {
        let viewport = Viewport::sized(400.0, 300.0);
        assert_eq!(visible_source_rect(&viewport, Size::new(10.0, 10.0), 0.0, Point::ORIGIN), None);
        assert_eq!(visible_source_rect(&viewport, Size::new(10.0, 10.0), f64::NAN, Point::ORIGIN), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::rotated_bounds;
    use proptest::prelude::*;

    proptest! {
        /// Property: a crop drawn inside the displayed image resolves to a
        /// rectangle inside the transformed bounds, at least 1px on each side.
        #[test]
        fn prop_crop_inside_display_stays_in_bounds(
            w in 10.0f64..3000.0,
            h in 10.0f64..3000.0,
            angle in -375.0f64..375.0,
            zoom in 0.1f64..10.0,
            pan_x in -500.0f64..500.0,
            pan_y in -500.0f64..500.0,
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
            fw in 0.0f64..1.0,
            fh in 0.0f64..1.0,
        ) {
            let natural = rotated_bounds(Size::new(w, h), angle);
            let viewport = Viewport::new(Point::new(37.0, 12.0), Size::new(1024.0, 768.0));
            let pan = Point::new(pan_x, pan_y);
            let display = viewport.display_rect(natural, zoom, pan);

            // Pick the selection in transformed space so it spans at least a pixel.
            let sel_w = 1.0 + fw * (natural.width - 1.0);
            let sel_h = 1.0 + fh * (natural.height - 1.0);
            let sel_x = fx * (natural.width - sel_w);
            let sel_y = fy * (natural.height - sel_h);
            let crop = CropBox {
                start_x: display.x + (sel_x + sel_w) * zoom,
                start_y: display.y + sel_y * zoom,
                end_x: display.x + sel_x * zoom,
                end_y: display.y + (sel_y + sel_h) * zoom,
            };

            let rect = map_crop_to_source(&viewport, natural, zoom, pan, &crop).unwrap();
            let eps = 1e-6 * natural.width.max(natural.height);
            prop_assert!(rect.x >= -eps);
            prop_assert!(rect.y >= -eps);
            prop_assert!(rect.right() <= natural.width + eps);
            prop_assert!(rect.bottom() <= natural.height + eps);
            prop_assert!(rect.width >= 1.0);
            prop_assert!(rect.height >= 1.0);
        }

        /// Property: fitting never yields a non-finite or non-positive zoom.
        #[test]
        fn prop_fit_zoom_is_positive(
            cw in 0.0f64..4000.0,
            ch in 0.0f64..4000.0,
            iw in 0.0f64..8000.0,
            ih in 0.0f64..8000.0,
            side in any::<bool>(),
        ) {
            if let Some(zoom) = fit_zoom(Size::new(cw, ch), Size::new(iw, ih), side, 0.95) {
                prop_assert!(zoom.is_finite() && zoom > 0.0);
            }
        }
    }
}
