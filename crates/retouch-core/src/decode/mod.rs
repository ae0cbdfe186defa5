//! Asset loading for the edit pipeline.
//!
//! Decodes any format the `image` crate is built with (JPEG and PNG),
//! applies EXIF orientation and hands back straight RGBA8. A decode
//! failure aborts the operation that requested the asset; nothing is
//! committed to an edit or mask session.

mod loader;
mod types;

pub use loader::{decode_image, decode_image_no_orientation, get_orientation};
pub use types::{DecodeError, DecodedImage, Orientation, CHANNELS};
