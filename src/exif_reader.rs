use exif::{In, Reader, Tag};
use log::debug;
use std::io::Cursor;

/// EXIF orientation (1-8) of an encoded image. Payloads without EXIF (PNG
/// screenshots, stripped uploads) yield `None`.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF in uploaded photo: {}", e);
            return None;
        }
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}
