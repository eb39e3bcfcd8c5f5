//! Turns an uploaded photo string into an upright RGB raster.
//!
//! Accepts raw base64 or a data URI (`data:image/jpeg;base64,...`); anything
//! up to and including the first comma is dropped before decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;

use crate::exif_reader::read_orientation;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Empty image payload")]
    Empty,
    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// A decoded upload ready for cropping
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    pub image: RgbImage,
}

/// Base64 payload with an optional `<scheme>,` prefix removed
pub fn strip_data_uri(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, NormalizeError> {
    let payload: String = strip_data_uri(encoded)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if payload.is_empty() {
        return Err(NormalizeError::Empty);
    }

    Ok(STANDARD.decode(payload)?)
}

/// Decodes an uploaded photo, rotates it upright and converts it to RGB8
pub fn normalize_photo(encoded: &str) -> Result<NormalizedPhoto, NormalizeError> {
    let bytes = decode_payload(encoded)?;
    let orientation = read_orientation(&bytes);

    let img = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .decode()?;
    let img = apply_orientation(img, orientation);

    Ok(NormalizedPhoto {
        image: img.to_rgb8(),
    })
}

fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => img.fliph(),
        Some(3) => img.rotate180(),
        Some(4) => img.flipv(),
        Some(5) => img.fliph().rotate270(),
        Some(6) => img.rotate90(),
        Some(7) => img.fliph().rotate90(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}
