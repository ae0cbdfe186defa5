//! Asset loading: any supported format, EXIF orientation applied, RGBA out.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an encoded image buffer, applying EXIF orientation correction.
///
/// The format is sniffed from the content. The result is always RGBA8 so
/// that matting and compositing can write alpha.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` when the format cannot be guessed,
/// `DecodeError::CorruptedFile` when the decoder rejects the data and
/// `DecodeError::EmptyImage` for a zero-sized result.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let oriented = apply_orientation(img, orientation);
    finish(oriented)
}

/// Decode without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    finish(decode_dynamic(bytes)?)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn finish(img: DynamicImage) -> Result<DecodedImage, DecodeError> {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }
    log::debug!("decoded {}x{} image", width, height);
    Ok(DecodedImage::from_rgba_image(rgba))
}

/// Extract EXIF orientation from an encoded buffer.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
