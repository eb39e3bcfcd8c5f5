//! Per-tile date captions.
//!
//! A caption comes from the tile's metadata entry only: the client's EXIF
//! fields, then the upload timestamp. Without an entry, or with neither date,
//! the tile is marked as having no capture metadata.

use crate::collage::labels::Labels;
use crate::collage_types::PhotoMetadataEntry;

/// Caption for a tile from its client-supplied metadata entry
pub fn resolve_caption(entry: Option<&PhotoMetadataEntry>, labels: &Labels) -> String {
    if let Some(raw) = entry.and_then(PhotoMetadataEntry::capture_date) {
        return format!("{}{}", labels.captured, format_capture_date(raw));
    }

    if let Some(raw) = entry.and_then(PhotoMetadataEntry::upload_date) {
        return format!("{}{}", labels.uploaded, format_upload_date(raw));
    }

    labels.no_metadata.to_string()
}

/// `"2024:03:15 10:00:00"` or `"2024-03-15..."` -> `"15.03.2024"`
pub fn format_capture_date(raw: &str) -> String {
    let date = date_prefix(raw);
    let separator = if date.contains(':') { ':' } else { '-' };
    reorder_to_dots(&date, separator)
}

/// ISO `"2024-03-15T08:00:00Z"` -> `"2024.03.15"`, order kept
pub fn format_upload_date(raw: &str) -> String {
    date_prefix(raw).replace('-', ".")
}

fn date_prefix(raw: &str) -> String {
    raw.trim().trim_matches('"').chars().take(10).collect()
}

fn reorder_to_dots(date: &str, separator: char) -> String {
    let parts: Vec<&str> = date.split(separator).collect();

    match parts.as_slice() {
        [year, month, day] if year.len() == 4 && !month.is_empty() && !day.is_empty() => {
            format!("{}.{}.{}", day, month, year)
        }
        _ => date.replace(separator, "."),
    }
}
