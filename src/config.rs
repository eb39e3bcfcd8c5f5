use std::env;
use std::path::PathBuf;

use crate::collage::composer::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_ROWS};
use crate::collage::text::{DEFAULT_BOLD_FONT, DEFAULT_REGULAR_FONT};
use crate::collage::Locale;

#[derive(Debug, Clone)]
pub struct FontConfig {
    pub bold_path: PathBuf,
    pub regular_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub locale: Locale,
    pub fonts: FontConfig,
    pub max_rows: usize,
    pub jpeg_quality: u8,
    pub max_body_bytes: u64,
    pub age_model_url: Option<String>,
    pub age_model_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let max_body_mb: u64 = env::var("PHOTO_DIARY_MAX_BODY_MB")
            .unwrap_or_else(|_| "64".to_string())
            .parse()?;

        Ok(Config {
            port: env::var("PHOTO_DIARY_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            host: env::var("PHOTO_DIARY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            locale: env::var("PHOTO_DIARY_LOCALE")
                .unwrap_or_else(|_| "en".to_string())
                .parse()?,
            fonts: FontConfig {
                bold_path: env::var("PHOTO_DIARY_FONT_BOLD")
                    .unwrap_or_else(|_| DEFAULT_BOLD_FONT.to_string())
                    .into(),
                regular_path: env::var("PHOTO_DIARY_FONT_REGULAR")
                    .unwrap_or_else(|_| DEFAULT_REGULAR_FONT.to_string())
                    .into(),
            },
            max_rows: env::var("PHOTO_DIARY_MAX_ROWS")
                .unwrap_or_else(|_| DEFAULT_MAX_ROWS.to_string())
                .parse()?,
            jpeg_quality: env::var("PHOTO_DIARY_JPEG_QUALITY")
                .unwrap_or_else(|_| DEFAULT_JPEG_QUALITY.to_string())
                .parse()?,
            max_body_bytes: max_body_mb * 1024 * 1024,
            age_model_url: env::var("PHOTO_DIARY_AGE_MODEL_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            age_model_timeout_secs: env::var("PHOTO_DIARY_AGE_MODEL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            host: "0.0.0.0".to_string(),
            locale: Locale::default(),
            fonts: FontConfig {
                bold_path: DEFAULT_BOLD_FONT.into(),
                regular_path: DEFAULT_REGULAR_FONT.into(),
            },
            max_rows: DEFAULT_MAX_ROWS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_body_bytes: 64 * 1024 * 1024,
            age_model_url: None,
            age_model_timeout_secs: 30,
        }
    }
}
