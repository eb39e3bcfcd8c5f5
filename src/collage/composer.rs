use chrono::NaiveDate;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ImageBuffer, Rgb, RgbImage};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

use crate::collage::caption::resolve_caption;
use crate::collage::footer::compose_footer_lines;
use crate::collage::labels::Labels;
use crate::collage::layout::CollageSpec;
use crate::collage::text::{draw_text, text_width, wrap_text, FontSet, FontWeight, TextStyle};
use crate::collage::tile::render_tile;
use crate::collage::CollageError;
use crate::collage_types::{CollageMetadata, PhotoRow, Side, UserInfo};
use crate::image_normalizer::{normalize_photo, NormalizedPhoto};

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const CAPTION_COLOR: Rgb<u8> = Rgb([110, 110, 110]);
const FOOTER_PANEL_COLOR: Rgb<u8> = Rgb([242, 242, 245]);
const FOOTER_INSET: u32 = 20;
const ELLIPSIS: &str = "…";

pub const DEFAULT_MAX_ROWS: usize = 12;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Everything one collage request provides
pub struct CollageInput<'a> {
    pub rows: &'a [PhotoRow],
    pub metadata: &'a CollageMetadata,
    pub user_info: &'a UserInfo,
    /// Date printed in the header
    pub today: NaiveDate,
}

#[derive(Debug)]
pub struct EncodedCollage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedCollage {
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// Both halves of one row after decoding; `None` marks an empty slot
struct DecodedRow {
    before: Option<NormalizedPhoto>,
    after: Option<NormalizedPhoto>,
}

impl DecodedRow {
    fn slot(&self, side: Side) -> Option<&NormalizedPhoto> {
        match side {
            Side::Before => self.before.as_ref(),
            Side::After => self.after.as_ref(),
        }
    }
}

/// Renders before/after collages. Holds only read-only configuration, one
/// instance is shared by all requests.
pub struct CollageComposer {
    spec: CollageSpec,
    fonts: Arc<FontSet>,
    labels: &'static Labels,
    max_rows: usize,
    jpeg_quality: u8,
}

impl CollageComposer {
    pub fn new(spec: CollageSpec, fonts: Arc<FontSet>, labels: &'static Labels) -> Self {
        Self {
            spec,
            fonts,
            labels,
            max_rows: DEFAULT_MAX_ROWS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn spec(&self) -> &CollageSpec {
        &self.spec
    }

    /// Decodes, lays out and encodes a collage
    pub fn compose(&self, input: &CollageInput<'_>) -> Result<EncodedCollage, CollageError> {
        let canvas = self.render(input)?;
        let (width, height) = canvas.dimensions();
        let bytes = self.encode(&canvas)?;

        info!(
            "Collage composed: {} rows, {}x{}, {} bytes",
            input.rows.len(),
            width,
            height,
            bytes.len()
        );

        Ok(EncodedCollage {
            bytes,
            width,
            height,
        })
    }

    /// Lays out the collage without encoding it
    pub fn render(&self, input: &CollageInput<'_>) -> Result<RgbImage, CollageError> {
        self.validate_row_count(input.rows.len())?;

        let decoded = decode_rows(input.rows);
        if decoded
            .iter()
            .all(|row| row.before.is_none() && row.after.is_none())
        {
            return Err(CollageError::NoUsablePhotos);
        }

        let (width, height) = self.spec.canvas_size(input.rows.len())?;
        let mut canvas: RgbImage = ImageBuffer::from_pixel(width, height, self.spec.background);

        self.draw_header(&mut canvas, input);

        for (index, (row, photos)) in input.rows.iter().zip(&decoded).enumerate() {
            let photo_type = row.type_key(index);
            for side in [Side::Before, Side::After] {
                if let Some(photo) = photos.slot(side) {
                    self.draw_tile(&mut canvas, index, side, &photo_type, photo, input.metadata)?;
                }
            }
        }

        self.draw_footer(&mut canvas, input.rows.len(), input.user_info)?;

        Ok(canvas)
    }

    fn validate_row_count(&self, count: usize) -> Result<(), CollageError> {
        if count == 0 {
            return Err(CollageError::NoRows);
        }
        if count > self.max_rows {
            return Err(CollageError::TooManyRows {
                count,
                max: self.max_rows,
            });
        }
        Ok(())
    }

    fn style(&self, weight: FontWeight, px: f32, color: Rgb<u8>) -> TextStyle {
        TextStyle { weight, px, color }
    }

    fn draw_header(&self, canvas: &mut RgbImage, input: &CollageInput<'_>) {
        let username = input
            .user_info
            .display_name()
            .unwrap_or(self.labels.default_username);
        let header = format!(
            "{} | {} | {}",
            self.labels.title,
            username,
            input.today.format("%d.%m.%Y")
        );

        let style = self.style(FontWeight::Bold, self.spec.large_font_px(), TEXT_COLOR);
        let rect = self.spec.header_rect();
        let y = rect.y + rect.height * 3 / 8;
        draw_text(canvas, &self.fonts, &style, rect.x as i32, y as i32, &header);
    }

    fn draw_tile(
        &self,
        canvas: &mut RgbImage,
        row: usize,
        side: Side,
        photo_type: &str,
        photo: &NormalizedPhoto,
        metadata: &CollageMetadata,
    ) -> Result<(), CollageError> {
        let tile = render_tile(&photo.image, self.spec.tile_size);
        let rect = self.spec.tile_rect(row, side)?;
        imageops::replace(canvas, &tile, rect.x as i64, rect.y as i64);

        let caption = self.tile_caption(metadata, side, photo_type);
        debug!("Row {} {} ({}): {}", row, side, photo_type, caption);

        let band = self.spec.caption_rect(row, side)?;
        let mut style = self.style(FontWeight::Regular, self.spec.small_font_px(), CAPTION_COLOR);
        let width = text_width(&self.fonts, &style, &caption);
        if width > band.width {
            // Keep the caption inside its own column
            style.px *= band.width as f32 / width as f32;
        }
        let y = band.y + (band.height.saturating_sub(style.px as u32)) / 2;
        draw_text(canvas, &self.fonts, &style, band.x as i32, y as i32, &caption);

        Ok(())
    }

    /// Caption text for one tile, taken from its metadata entry alone
    fn tile_caption(&self, metadata: &CollageMetadata, side: Side, photo_type: &str) -> String {
        resolve_caption(metadata.entry(side, photo_type), self.labels)
    }

    fn draw_footer(
        &self,
        canvas: &mut RgbImage,
        row_count: usize,
        user_info: &UserInfo,
    ) -> Result<(), CollageError> {
        let footer = self.spec.footer_rect(row_count)?;
        let panel_height = footer.height.saturating_sub(self.spec.border / 2);
        let panel = RgbImage::from_pixel(footer.width, panel_height, FOOTER_PANEL_COLOR);
        imageops::replace(canvas, &panel, footer.x as i64, footer.y as i64);

        let text_x = (footer.x + FOOTER_INSET) as i32;
        let label_style = self.style(FontWeight::Bold, self.spec.normal_font_px(), TEXT_COLOR);
        draw_text(
            canvas,
            &self.fonts,
            &label_style,
            text_x,
            (footer.y + FOOTER_INSET) as i32,
            self.labels.questionnaire,
        );

        let line_style = self.style(FontWeight::Regular, self.spec.small_font_px(), TEXT_COLOR);
        let lines_top = footer.y + FOOTER_INSET + label_style.px.ceil() as u32 + FOOTER_INSET;
        let capacity = (footer.y + panel_height)
            .saturating_sub(lines_top)
            .checked_div(self.spec.footer_line_spacing)
            .unwrap_or(0) as usize;
        let max_width = footer.width.saturating_sub(2 * FOOTER_INSET);

        let lines = fit_lines(
            compose_footer_lines(user_info, self.labels)
                .iter()
                .flat_map(|line| wrap_text(&self.fonts, &line_style, line, max_width))
                .collect(),
            capacity,
        );

        for (i, line) in lines.iter().enumerate() {
            let y = lines_top + i as u32 * self.spec.footer_line_spacing;
            draw_text(canvas, &self.fonts, &line_style, text_x, y as i32, line);
        }

        Ok(())
    }

    fn encode(&self, canvas: &RgbImage) -> Result<Vec<u8>, CollageError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality).encode_image(canvas)?;
        Ok(bytes)
    }
}

/// Decodes every slot independently; a bad photo only empties its own slot
fn decode_rows(rows: &[PhotoRow]) -> Vec<DecodedRow> {
    rows.par_iter()
        .enumerate()
        .map(|(index, row)| DecodedRow {
            before: decode_slot(row, index, Side::Before),
            after: decode_slot(row, index, Side::After),
        })
        .collect()
}

fn decode_slot(row: &PhotoRow, index: usize, side: Side) -> Option<NormalizedPhoto> {
    let encoded = row.photo(side)?;

    match normalize_photo(encoded) {
        Ok(photo) => {
            debug!(
                "Row {}: {} photo loaded ({}x{})",
                index,
                side,
                photo.image.width(),
                photo.image.height()
            );
            Some(photo)
        }
        Err(e) => {
            warn!("Row {}: failed to load {} photo: {}", index, side, e);
            None
        }
    }
}

/// Truncates to `capacity` lines, marking the cut on the last kept line
fn fit_lines(mut lines: Vec<String>, capacity: usize) -> Vec<String> {
    if lines.len() <= capacity {
        return lines;
    }

    lines.truncate(capacity);
    if let Some(last) = lines.last_mut() {
        last.push_str(ELLIPSIS);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::labels::EN;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn small_spec() -> CollageSpec {
        CollageSpec {
            tile_size: 120,
            padding: 10,
            row_spacing: 30,
            border: 20,
            header_height: 40,
            footer_height: 160,
            caption_height: 20,
            footer_line_spacing: 14,
            background: Rgb([255, 255, 255]),
        }
    }

    fn composer() -> CollageComposer {
        CollageComposer::new(small_spec(), Arc::new(FontSet::embedded()), &EN)
    }

    fn photo(width: u32, height: u32, color: [u8; 3]) -> String {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    fn assert_close(actual: Rgb<u8>, expected: Rgb<u8>) {
        for channel in 0..3 {
            assert!(
                (actual[channel] as i16 - expected[channel] as i16).abs() <= 2,
                "{:?} != {:?}",
                actual,
                expected
            );
        }
    }

    fn row(before: Option<String>, after: Option<String>) -> PhotoRow {
        PhotoRow {
            before_photo: before,
            after_photo: after,
            photo_type: Some("front".to_string()),
        }
    }

    fn input<'a>(
        rows: &'a [PhotoRow],
        metadata: &'a CollageMetadata,
        user_info: &'a UserInfo,
    ) -> CollageInput<'a> {
        CollageInput {
            rows,
            metadata,
            user_info,
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_canvas_matches_geometry() {
        let composer = composer();
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();

        for count in [1usize, 2, 6] {
            let rows: Vec<PhotoRow> = (0..count)
                .map(|_| row(Some(photo(30, 40, [200, 0, 0])), Some(photo(40, 30, [0, 0, 200]))))
                .collect();
            let canvas = composer
                .render(&input(&rows, &metadata, &user_info))
                .unwrap();
            assert_eq!(
                canvas.dimensions(),
                small_spec().canvas_size(count).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_rows_rejected() {
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let result = composer().render(&input(&[], &metadata, &user_info));
        assert!(matches!(result, Err(CollageError::NoRows)));
    }

    #[test]
    fn test_too_many_rows_rejected() {
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let rows = vec![row(None, None); 3];
        let result = composer()
            .with_max_rows(2)
            .render(&input(&rows, &metadata, &user_info));
        assert!(matches!(
            result,
            Err(CollageError::TooManyRows { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_missing_after_photo_leaves_slot_blank() {
        let spec = small_spec();
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let rows = vec![row(Some(photo(50, 50, [200, 0, 0])), None)];

        let canvas = composer()
            .render(&input(&rows, &metadata, &user_info))
            .unwrap();

        let before = spec.tile_rect(0, Side::Before).unwrap();
        let after = spec.tile_rect(0, Side::After).unwrap();
        let center = |x: u32, y: u32| *canvas.get_pixel(x + spec.tile_size / 2, y + spec.tile_size / 2);

        assert_close(center(before.x, before.y), Rgb([200, 0, 0]));
        assert_eq!(center(after.x, after.y), spec.background);

        // No caption under the empty slot either
        let caption = spec.caption_rect(0, Side::After).unwrap();
        for y in caption.y..caption.y + caption.height {
            for x in caption.x..caption.x + caption.width {
                assert_eq!(*canvas.get_pixel(x, y), spec.background);
            }
        }
    }

    #[test]
    fn test_bad_photo_degrades_to_empty_slot() {
        let spec = small_spec();
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let rows = vec![row(
            Some("data:image/png;base64,bm90IGFuIGltYWdl".to_string()),
            Some(photo(60, 90, [0, 150, 0])),
        )];

        let canvas = composer()
            .render(&input(&rows, &metadata, &user_info))
            .unwrap();

        let before = spec.tile_rect(0, Side::Before).unwrap();
        let after = spec.tile_rect(0, Side::After).unwrap();
        assert_eq!(
            *canvas.get_pixel(before.x + 60, before.y + 60),
            spec.background
        );
        assert_close(*canvas.get_pixel(after.x + 60, after.y + 60), Rgb([0, 150, 0]));
    }

    #[test]
    fn test_all_photos_unusable_is_an_error() {
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let rows = vec![
            row(Some("garbage".to_string()), None),
            row(None, None),
        ];
        let result = composer().render(&input(&rows, &metadata, &user_info));
        assert!(matches!(result, Err(CollageError::NoUsablePhotos)));
    }

    #[test]
    fn test_caption_drawn_under_tile() {
        let spec = small_spec();
        let metadata = CollageMetadata::default();
        let user_info = UserInfo::default();
        let rows = vec![row(Some(photo(50, 50, [200, 0, 0])), None)];

        let canvas = composer()
            .render(&input(&rows, &metadata, &user_info))
            .unwrap();

        let caption = spec.caption_rect(0, Side::Before).unwrap();
        let mut inked = false;
        for y in caption.y..caption.y + caption.height {
            for x in caption.x..caption.x + caption.width {
                if *canvas.get_pixel(x, y) != spec.background {
                    inked = true;
                }
            }
        }
        assert!(inked);
    }

    #[test]
    fn test_encoded_collage_round_trips_dimensions() {
        let metadata = CollageMetadata::default();
        let user_info: UserInfo = serde_json::from_value(serde_json::json!({
            "username": "anna",
            "weightBefore": 70,
            "commentsBefore": "a rather long comment that will need to wrap across several lines of the footer panel"
        }))
        .unwrap();
        let rows = vec![
            row(Some(photo(80, 120, [10, 10, 10])), Some(photo(120, 80, [240, 240, 0]))),
            row(None, Some(photo(64, 64, [0, 0, 0]))),
        ];

        let collage = composer()
            .compose(&input(&rows, &metadata, &user_info))
            .unwrap();
        assert_eq!(collage.mime_type(), "image/jpeg");

        let decoded = image::load_from_memory(&collage.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (collage.width, collage.height));
        assert_eq!(
            (collage.width, collage.height),
            small_spec().canvas_size(2).unwrap()
        );
    }

    #[test]
    fn test_tile_caption_uses_metadata_entry_only() {
        let composer = composer();
        let metadata: CollageMetadata = serde_json::from_value(serde_json::json!({
            "before": {"front": {"uploadDate": "2024-03-15T08:00:00Z"}},
            "after": {"front": {"exifData": {"DateTime": "2024:06:01 09:00:00"}}}
        }))
        .unwrap();

        assert_eq!(
            composer.tile_caption(&metadata, Side::Before, "front"),
            "Uploaded: 2024.03.15"
        );
        assert_eq!(
            composer.tile_caption(&metadata, Side::After, "front"),
            "Captured: 01.06.2024"
        );
        assert_eq!(
            composer.tile_caption(&metadata, Side::Before, "side"),
            EN.no_metadata
        );
    }

    #[test]
    fn test_fit_lines_truncates_with_ellipsis() {
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(fit_lines(lines.clone(), 3), lines);
        assert_eq!(fit_lines(lines, 2), vec!["a".to_string(), "b…".to_string()]);
        assert!(fit_lines(vec!["a".to_string()], 0).is_empty());
    }
}
