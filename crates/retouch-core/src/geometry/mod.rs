//! Coordinate spaces of the edit pipeline.
//!
//! Three spaces are involved:
//!
//! - **Source space**: pixels of the image being edited.
//! - **Transformed space**: the flipped and rotated image, laid out in its
//!   axis-aligned bounding box (see [`rotated_bounds`]). Crops are resolved
//!   here.
//! - **Screen space**: display pixels. The container (the element the
//!   preview is drawn in) has a screen origin and a measured size; the
//!   transformed image is centered in it, scaled by the edit zoom and
//!   shifted by the pan.
//!
//! The functions here are pure. Nothing materializes a raster; the
//! compositor consumes their results once, at apply time.
//!
//! # Layout failures
//!
//! A container that has not been laid out yet measures `0x0`. Every
//! function that would divide by a measured size returns `None` in that
//! case, and callers treat `None` as "do nothing".

mod bounds;
mod types;
mod viewport;

pub use bounds::{composed_angle_degrees, raster_dimensions, rotated_bounds};
pub use types::{CropBox, Point, Rect, Size};
pub use viewport::{fit_to_height, fit_zoom, map_crop_to_source, visible_source_rect, Viewport};
