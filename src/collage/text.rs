use image::{Rgb, RgbImage};
use log::{debug, warn};
use rusttype::{point, Font, Scale};
use std::path::Path;

/// Plain face compiled into the binary, used when the preferred fonts are missing
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

pub const DEFAULT_BOLD_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
pub const DEFAULT_REGULAR_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    Preferred,
    Embedded,
    Missing,
}

/// Bold and regular faces shared by every collage render
pub struct FontSet {
    bold: Option<Font<'static>>,
    regular: Option<Font<'static>>,
    bold_source: FontSource,
    regular_source: FontSource,
}

impl FontSet {
    /// Loads the preferred faces, falling back to the regular face for bold
    /// and to the embedded face for both. Never fails.
    pub fn load(bold_path: &Path, regular_path: &Path) -> Self {
        let preferred_regular = load_font_file(regular_path);
        let preferred_bold = load_font_file(bold_path);

        let (regular, regular_source) = match preferred_regular {
            Some(font) => (Some(font), FontSource::Preferred),
            None => embedded_font(),
        };

        let (bold, bold_source) = match preferred_bold {
            Some(font) => (Some(font), FontSource::Preferred),
            None if regular_source == FontSource::Preferred => {
                warn!("Bold font unavailable, using regular face for headings");
                (regular.clone(), FontSource::Preferred)
            }
            None => embedded_font(),
        };

        Self {
            bold,
            regular,
            bold_source,
            regular_source,
        }
    }

    /// Embedded face only, no filesystem access
    pub fn embedded() -> Self {
        let (font, source) = embedded_font();
        Self {
            bold: font.clone(),
            regular: font,
            bold_source: source,
            regular_source: source,
        }
    }

    pub fn bold_source(&self) -> FontSource {
        self.bold_source
    }

    pub fn regular_source(&self) -> FontSource {
        self.regular_source
    }

    pub fn face(&self, weight: FontWeight) -> Option<&Font<'static>> {
        match weight {
            FontWeight::Bold => self.bold.as_ref(),
            FontWeight::Regular => self.regular.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Bold,
    Regular,
}

/// Font weight, pixel size and color of one piece of text
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub weight: FontWeight,
    pub px: f32,
    pub color: Rgb<u8>,
}

fn load_font_file(path: &Path) -> Option<Font<'static>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Font {} not readable: {}", path.display(), e);
            return None;
        }
    };

    match Font::try_from_vec(data) {
        Some(font) => {
            debug!("Loaded font {}", path.display());
            Some(font)
        }
        None => {
            warn!("Font {} could not be parsed", path.display());
            None
        }
    }
}

fn embedded_font() -> (Option<Font<'static>>, FontSource) {
    match Font::try_from_bytes(EMBEDDED_FONT_DATA) {
        Some(font) => (Some(font), FontSource::Embedded),
        None => {
            warn!("Embedded font could not be parsed, text will be skipped");
            (None, FontSource::Missing)
        }
    }
}

/// Advance width of `text` in pixels
pub fn text_width(fonts: &FontSet, style: &TextStyle, text: &str) -> u32 {
    let Some(font) = fonts.face(style.weight) else {
        return 0;
    };
    let scale = Scale::uniform(style.px);

    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
        .ceil() as u32
}

/// Draws `text` with its top-left corner at `(x, y)`, alpha-blending glyph
/// coverage over the canvas. Pixels outside the canvas are clipped.
pub fn draw_text(canvas: &mut RgbImage, fonts: &FontSet, style: &TextStyle, x: i32, y: i32, text: &str) {
    let Some(font) = fonts.face(style.weight) else {
        return;
    };
    let scale = Scale::uniform(style.px);
    let ascent = font.v_metrics(scale).ascent;
    let (width, height) = canvas.dimensions();

    for glyph in font.layout(text, scale, point(x as f32, y as f32 + ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };

        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x + gx as i32;
            let py = bb.min.y + gy as i32;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }

            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            let alpha = coverage.clamp(0.0, 1.0);
            for channel in 0..3 {
                let bg = pixel[channel] as f32;
                let fg = style.color[channel] as f32;
                pixel[channel] = (bg + (fg - bg) * alpha).round() as u8;
            }
        });
    }
}

/// Greedy word wrap to `max_width` pixels. Words wider than a line are kept
/// whole on their own line.
pub fn wrap_text(fonts: &FontSet, style: &TextStyle, text: &str, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if !current.is_empty() && text_width(fonts, style, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn style(px: f32) -> TextStyle {
        TextStyle {
            weight: FontWeight::Regular,
            px,
            color: Rgb([0, 0, 0]),
        }
    }

    #[test]
    fn test_missing_font_files_fall_back_to_embedded() {
        let fonts = FontSet::load(
            Path::new("/nonexistent/bold.ttf"),
            Path::new("/nonexistent/regular.ttf"),
        );
        assert_eq!(fonts.bold_source(), FontSource::Embedded);
        assert_eq!(fonts.regular_source(), FontSource::Embedded);
        assert!(fonts.face(FontWeight::Bold).is_some());
    }

    #[test]
    fn test_garbage_font_file_falls_back_to_embedded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a truetype font").unwrap();

        let fonts = FontSet::load(file.path(), file.path());
        assert_eq!(fonts.regular_source(), FontSource::Embedded);
        assert!(fonts.face(FontWeight::Regular).is_some());
    }

    #[test]
    fn test_preferred_regular_stands_in_for_missing_bold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EMBEDDED_FONT_DATA).unwrap();

        let fonts = FontSet::load(Path::new("/nonexistent/bold.ttf"), file.path());
        assert_eq!(fonts.regular_source(), FontSource::Preferred);
        assert_eq!(fonts.bold_source(), FontSource::Preferred);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let fonts = FontSet::embedded();
        let mut canvas = RgbImage::from_pixel(200, 40, Rgb([255, 255, 255]));
        draw_text(&mut canvas, &fonts, &style(24.0), 4, 4, "Hello");

        assert!(canvas.pixels().any(|p| p[0] < 128));
    }

    #[test]
    fn test_draw_text_clips_outside_canvas() {
        let fonts = FontSet::embedded();
        let mut canvas = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        draw_text(&mut canvas, &fonts, &style(40.0), -30, -30, "Clipped text");
        draw_text(&mut canvas, &fonts, &style(40.0), 15, 15, "Clipped text");
    }

    #[test]
    fn test_text_width_grows_with_text() {
        let fonts = FontSet::embedded();
        let short = text_width(&fonts, &style(20.0), "ab");
        let long = text_width(&fonts, &style(20.0), "abcdef");
        assert!(short > 0);
        assert!(long > short);
        assert_eq!(text_width(&fonts, &style(20.0), ""), 0);
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let fonts = FontSet::embedded();
        let s = style(20.0);
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let max_width = text_width(&fonts, &s, "the quick brown fox");

        let lines = wrap_text(&fonts, &s, text, max_width);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
        for line in &lines {
            assert!(text_width(&fonts, &s, line) <= max_width);
        }
    }

    #[test]
    fn test_wrap_text_keeps_long_word() {
        let fonts = FontSet::embedded();
        let lines = wrap_text(&fonts, &style(20.0), "supercalifragilistic", 10);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }
}
