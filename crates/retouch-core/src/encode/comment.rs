//! Best-effort EXIF comment embedding for JPEG export.
//!
//! The comment is stored as the primary IFD `ImageDescription` inside an
//! APP1 `Exif` segment placed right after SOI (or after a leading JFIF
//! APP0 segment).

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};

use super::EncodeError;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: [u8; 2] = [0xFF, 0xE0];
const APP1: [u8; 2] = [0xFF, 0xE1];

/// Return a copy of `jpeg` carrying `comment` as its EXIF image description.
pub fn embed_comment(jpeg: &[u8], comment: &str) -> Result<Vec<u8>, EncodeError> {
    if jpeg.len() < 4 || jpeg[0..2] != SOI {
        return Err(EncodeError::Metadata("not a JPEG stream".to_string()));
    }

    let field = Field {
        tag: Tag::ImageDescription,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![comment.as_bytes().to_vec()]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut tiff = Cursor::new(Vec::new());
    writer
        .write(&mut tiff, false)
        .map_err(|e| EncodeError::Metadata(e.to_string()))?;
    let tiff = tiff.into_inner();

    // The length field counts itself but not the marker.
    let payload_len = 2 + EXIF_HEADER.len() + tiff.len();
    let segment_len = u16::try_from(payload_len)
        .map_err(|_| EncodeError::Metadata(format!("comment too long ({} bytes)", comment.len())))?;

    let insert_at = insertion_point(jpeg);
    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 2);
    out.extend_from_slice(&jpeg[..insert_at]);
    out.extend_from_slice(&APP1);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[insert_at..]);
    Ok(out)
}

/// Read back the EXIF image description, if any.
pub fn read_comment(bytes: &[u8]) -> Option<String> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(Tag::ImageDescription, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts
            .first()
            .map(|part| String::from_utf8_lossy(part).into_owned()),
        _ => None,
    }
}

fn insertion_point(jpeg: &[u8]) -> usize {
    if jpeg.len() >= 6 && jpeg[2..4] == APP0 {
        let len = u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;
        let end = 4 + len;
        if end <= jpeg.len() {
            return end;
        }
    }
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_jpeg;

    fn sample_jpeg() -> Vec<u8> {
        encode_jpeg(&vec![90u8; 8 * 8 * 4], 8, 8, 90).unwrap()
    }

    #[test]
    fn test_comment_round_trip() {
        let tagged = embed_comment(&sample_jpeg(), "Family reunion, 1962").unwrap();
        assert_eq!(read_comment(&tagged).as_deref(), Some("Family reunion, 1962"));
    }

    #[test]
    fn test_tagged_jpeg_still_decodes() {
        let tagged = embed_comment(&sample_jpeg(), "note").unwrap();
        let decoded = image::load_from_memory(&tagged).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn test_rejects_non_jpeg() {
        let result = embed_comment(b"\x89PNG\r\n\x1a\n", "note");
        assert!(matches!(result, Err(EncodeError::Metadata(_))));
    }

    #[test]
    fn test_oversized_comment_is_an_error() {
        let huge = "x".repeat(70_000);
        assert!(embed_comment(&sample_jpeg(), &huge).is_err());
    }

    #[test]
    fn test_plain_jpeg_has_no_comment() {
        assert_eq!(read_comment(&sample_jpeg()), None);
    }

    #[test]
    fn test_insertion_after_app0() {
        let mut fake = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB];
        fake.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(insertion_point(&fake), 8);
        assert_eq!(insertion_point(&[0xFF, 0xD8, 0xFF, 0xDB]), 2);
    }
}
