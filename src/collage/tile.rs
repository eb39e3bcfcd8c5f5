use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::collage::layout::Rect;

/// Fraction of the height skipped above a portrait crop, keeps faces in frame
const PORTRAIT_TOP_OFFSET: f64 = 0.05;

/// Largest square inside `width x height`.
///
/// Portrait sources are cropped from 5% below the top edge instead of the
/// vertical centre; everything else is centred on both axes.
pub fn square_crop_region(width: u32, height: u32) -> Rect {
    let size = width.min(height);

    let (x, y) = if height > width {
        let top = (PORTRAIT_TOP_OFFSET * height as f64).round() as u32;
        (0, top.min(height - size))
    } else {
        ((width - size) / 2, (height - size) / 2)
    };

    Rect {
        x,
        y,
        width: size,
        height: size,
    }
}

/// Square crop resampled to `tile_size x tile_size`
pub fn render_tile(photo: &RgbImage, tile_size: u32) -> RgbImage {
    let region = square_crop_region(photo.width(), photo.height());
    let cropped =
        imageops::crop_imm(photo, region.x, region.y, region.width, region.height).to_image();

    imageops::resize(&cropped, tile_size, tile_size, FilterType::Lanczos3)
}
