//! Apply: turning an edit state into one final raster.
//!
//! ## Order of operations
//! 1. Render the flipped and rotated intermediate at its bounding-box size
//! 2. Resolve the source rectangle: the explicit crop, or the visible
//!    viewport
//! 3. Size the output from that rectangle (rounded, at least 1x1)
//! 4. Draw the rectangle into the output, applying the color filter
//! 5. Encode, when an encoded result is wanted
//!
//! This runs once per session, at commit time.

use std::borrow::Cow;

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::{encode_image, EncodeError, ExportFormat};
use crate::geometry::{map_crop_to_source, visible_source_rect, Rect, Size, Viewport};
use crate::history::EditState;
use crate::surface::SurfaceError;
use crate::transform::{extract_region, render_transformed, InterpolationFilter};

/// Errors raised while composing the final raster.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The source image has no pixels.
    #[error("Nothing to compose: the source image is empty")]
    EmptySource,

    /// A drawing surface could not be acquired or written.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// The composed raster could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Which region of the transformed image ends up in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceRegion {
    /// A crop drawn on screen, resolved against the state's zoom and pan.
    Crop,
    /// Whatever the viewport currently shows.
    Viewport,
}

/// Transformed-space rectangle for `state` shown in `viewport`.
///
/// `None` when the layout is not measured yet, or when `Crop` is asked for
/// and the state has no crop box.
pub fn resolve_source_rect(
    image_size: Size,
    state: &EditState,
    viewport: &Viewport,
    region: SourceRegion,
) -> Option<Rect> {
    let natural = state.transform().bounds(image_size);
    match region {
        SourceRegion::Crop => {
            let crop = state.crop_box.as_ref()?;
            map_crop_to_source(viewport, natural, state.edit_zoom, state.edit_pan, crop)
        }
        SourceRegion::Viewport => {
            visible_source_rect(viewport, natural, state.edit_zoom, state.edit_pan)
        }
    }
}

/// Render `source_rect` of `image` under `state` into a new raster.
pub fn compose(
    image: &DecodedImage,
    state: &EditState,
    source_rect: Rect,
    interpolation: InterpolationFilter,
) -> Result<DecodedImage, ComposeError> {
    if image.is_empty() {
        return Err(ComposeError::EmptySource);
    }

    let params = state.transform();
    let bounds = params.bounds(Size::from_pixels(image.width, image.height));

    let intermediate = if params.angle_degrees.rem_euclid(360.0) == 0.0 && !params.is_flipped() {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(render_transformed(image, &params, interpolation)?)
    };

    // The rounded raster centers the fractional bounding box.
    let offset_x = (intermediate.width as f64 - bounds.width) / 2.0;
    let offset_y = (intermediate.height as f64 - bounds.height) / 2.0;
    let rect = Rect::new(
        source_rect.x + offset_x,
        source_rect.y + offset_y,
        source_rect.width,
        source_rect.height,
    );

    let output = extract_region(intermediate.as_ref(), rect, interpolation, &state.filter)?;
    log::info!(
        "composed {}x{} from {}x{} (angle {:.2}, filter {:?})",
        output.width,
        output.height,
        image.width,
        image.height,
        params.angle_degrees,
        state.filter.kind
    );
    Ok(output)
}

/// [`compose`] followed by encoding.
pub fn compose_encoded(
    image: &DecodedImage,
    state: &EditState,
    source_rect: Rect,
    interpolation: InterpolationFilter,
    format: ExportFormat,
    comment: Option<&str>,
) -> Result<Vec<u8>, ComposeError> {
    let raster = compose(image, state, source_rect, interpolation)?;
    Ok(encode_image(&raster, format, comment)?)
}
