use image::Rgb;

use crate::collage::CollageError;
use crate::collage_types::Side;

/// Fixed collage geometry, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageSpec {
    /// Side length of every square tile
    pub tile_size: u32,
    /// Horizontal gap between the before and after tile
    pub padding: u32,
    /// Vertical gap between rows; captions are drawn inside it
    pub row_spacing: u32,
    pub border: u32,
    pub header_height: u32,
    pub footer_height: u32,
    pub caption_height: u32,
    pub footer_line_spacing: u32,
    pub background: Rgb<u8>,
}

impl Default for CollageSpec {
    fn default() -> Self {
        Self {
            tile_size: 480,
            padding: 20,
            row_spacing: 50,
            border: 40,
            header_height: 80,
            footer_height: 360,
            caption_height: 34,
            footer_line_spacing: 30,
            background: Rgb([255, 255, 255]),
        }
    }
}

/// Rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CollageSpec {
    pub fn canvas_width(&self) -> u32 {
        2 * self.tile_size + self.padding + 2 * self.border
    }

    /// Height of the stacked photo rows, without the trailing row gap
    pub fn photos_height(&self, row_count: usize) -> Result<u32, CollageError> {
        if row_count == 0 {
            return Err(CollageError::NoRows);
        }

        u32::try_from(row_count)
            .ok()
            .and_then(|rows| (self.tile_size + self.row_spacing).checked_mul(rows))
            .map(|height| height - self.row_spacing)
            .ok_or(CollageError::CanvasTooLarge { rows: row_count })
    }

    pub fn canvas_height(&self, row_count: usize) -> Result<u32, CollageError> {
        let photos = self.photos_height(row_count)?;

        [photos, self.border, self.footer_height, self.border]
            .into_iter()
            .try_fold(self.header_height, |acc, part| acc.checked_add(part))
            .ok_or(CollageError::CanvasTooLarge { rows: row_count })
    }

    pub fn canvas_size(&self, row_count: usize) -> Result<(u32, u32), CollageError> {
        Ok((self.canvas_width(), self.canvas_height(row_count)?))
    }

    pub fn photos_top(&self) -> u32 {
        self.header_height + self.border
    }

    pub fn row_top(&self, row: usize) -> Result<u32, CollageError> {
        u32::try_from(row)
            .ok()
            .and_then(|row| (self.tile_size + self.row_spacing).checked_mul(row))
            .and_then(|offset| self.photos_top().checked_add(offset))
            .ok_or(CollageError::CanvasTooLarge {
                rows: row.saturating_add(1),
            })
    }

    pub fn slot_left(&self, side: Side) -> u32 {
        match side {
            Side::Before => self.border,
            Side::After => self.border + self.tile_size + self.padding,
        }
    }

    pub fn tile_rect(&self, row: usize, side: Side) -> Result<Rect, CollageError> {
        Ok(Rect {
            x: self.slot_left(side),
            y: self.row_top(row)?,
            width: self.tile_size,
            height: self.tile_size,
        })
    }

    /// Caption band directly beneath a tile
    pub fn caption_rect(&self, row: usize, side: Side) -> Result<Rect, CollageError> {
        let y = self
            .row_top(row)?
            .checked_add(self.tile_size)
            .ok_or(CollageError::CanvasTooLarge {
                rows: row.saturating_add(1),
            })?;

        Ok(Rect {
            x: self.slot_left(side),
            y,
            width: self.tile_size,
            height: self.caption_height,
        })
    }

    pub fn header_rect(&self) -> Rect {
        Rect {
            x: self.border,
            y: 0,
            width: self.canvas_width() - 2 * self.border,
            height: self.header_height,
        }
    }

    /// Questionnaire band below the last row's captions
    pub fn footer_rect(&self, row_count: usize) -> Result<Rect, CollageError> {
        let y = self
            .photos_top()
            .checked_add(self.photos_height(row_count)?)
            .and_then(|y| y.checked_add(self.border))
            .ok_or(CollageError::CanvasTooLarge { rows: row_count })?;

        Ok(Rect {
            x: self.border / 2,
            y,
            width: self.canvas_width() - self.border,
            height: self.footer_height,
        })
    }

    pub fn large_font_px(&self) -> f32 {
        self.tile_size as f32 / 15.0
    }

    pub fn normal_font_px(&self) -> f32 {
        self.tile_size as f32 / 20.0
    }

    pub fn small_font_px(&self) -> f32 {
        self.tile_size as f32 / 24.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_height(spec: &CollageSpec, rows: u32) -> u32 {
        spec.header_height + spec.border + (spec.tile_size + spec.row_spacing) * rows
            - spec.row_spacing
            + spec.footer_height
            + spec.border
    }

    #[test]
    fn test_canvas_width_has_two_columns() {
        let spec = CollageSpec::default();
        assert_eq!(spec.canvas_width(), 2 * 480 + 20 + 2 * 40);
    }

    #[test]
    fn test_canvas_height_matches_formula() {
        let spec = CollageSpec::default();
        for rows in [1u32, 2, 6] {
            assert_eq!(
                spec.canvas_height(rows as usize).unwrap(),
                expected_height(&spec, rows)
            );
        }
        assert_eq!(spec.canvas_height(1).unwrap(), 80 + 40 + 480 + 360 + 40);
    }

    #[test]
    fn test_zero_rows_is_rejected() {
        let spec = CollageSpec::default();
        assert!(matches!(spec.canvas_height(0), Err(CollageError::NoRows)));
    }

    #[test]
    fn test_absurd_row_count_does_not_overflow() {
        let spec = CollageSpec::default();
        assert!(matches!(
            spec.canvas_height(usize::MAX),
            Err(CollageError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_slot_positions() {
        let spec = CollageSpec::default();
        assert_eq!(spec.slot_left(Side::Before), 40);
        assert_eq!(spec.slot_left(Side::After), 40 + 480 + 20);
        assert_eq!(spec.row_top(0).unwrap(), 120);
        assert_eq!(spec.row_top(2).unwrap(), 120 + 2 * 530);
    }

    #[test]
    fn test_row_positions_beyond_u32_are_rejected() {
        let spec = CollageSpec::default();
        for row in [usize::MAX, 100_000_000] {
            assert!(matches!(
                spec.row_top(row),
                Err(CollageError::CanvasTooLarge { .. })
            ));
            assert!(spec.tile_rect(row, Side::After).is_err());
            assert!(spec.caption_rect(row, Side::Before).is_err());
        }
    }

    #[test]
    fn test_captions_fit_between_rows() {
        let spec = CollageSpec::default();
        let caption = spec.caption_rect(0, Side::Before).unwrap();
        assert!(caption.y + caption.height <= spec.row_top(1).unwrap());
    }

    #[test]
    fn test_footer_ends_inside_canvas() {
        let spec = CollageSpec::default();
        for rows in [1, 2, 6] {
            let footer = spec.footer_rect(rows).unwrap();
            let last_caption = spec.caption_rect(rows - 1, Side::After).unwrap();
            assert!(last_caption.y + last_caption.height <= footer.y);
            assert!(footer.y + footer.height <= spec.canvas_height(rows).unwrap());
        }
    }
}
