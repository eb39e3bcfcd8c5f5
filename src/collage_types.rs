use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which half of a before/after pair a photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Before,
    After,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Before => "before",
            Side::After => "after",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One before/after pair, rendered as a single horizontal band
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRow {
    #[serde(default)]
    pub before_photo: Option<String>,
    #[serde(default)]
    pub after_photo: Option<String>,
    #[serde(default, deserialize_with = "lenient_tag")]
    pub photo_type: Option<String>,
}

impl PhotoRow {
    pub fn photo(&self, side: Side) -> Option<&str> {
        let photo = match side {
            Side::Before => self.before_photo.as_deref(),
            Side::After => self.after_photo.as_deref(),
        };
        photo.filter(|p| !p.trim().is_empty())
    }

    /// Metadata lookup key; rows without a tag are keyed by their position
    pub fn type_key(&self, index: usize) -> String {
        self.photo_type
            .clone()
            .unwrap_or_else(|| index.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExifData {
    #[serde(rename = "DateTime", default, deserialize_with = "lenient_string")]
    pub date_time: Option<String>,
    #[serde(rename = "captureDate", default, deserialize_with = "lenient_string")]
    pub capture_date: Option<String>,
}

impl ExifData {
    pub fn capture_date(&self) -> Option<&str> {
        self.date_time
            .as_deref()
            .or(self.capture_date.as_deref())
            .filter(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadataEntry {
    #[serde(default, deserialize_with = "lenient_exif")]
    pub exif_data: Option<ExifData>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub upload_date: Option<String>,
}

impl PhotoMetadataEntry {
    pub fn capture_date(&self) -> Option<&str> {
        self.exif_data.as_ref().and_then(ExifData::capture_date)
    }

    pub fn upload_date(&self) -> Option<&str> {
        self.upload_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

/// Per-side metadata, keyed by photo type
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollageMetadata {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub before: HashMap<String, PhotoMetadataEntry>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub after: HashMap<String, PhotoMetadataEntry>,
}

impl CollageMetadata {
    pub fn entry(&self, side: Side, photo_type: &str) -> Option<&PhotoMetadataEntry> {
        match side {
            Side::Before => self.before.get(photo_type),
            Side::After => self.after.get(photo_type),
        }
    }
}

/// A questionnaire value that may arrive as a JSON number or string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Blank strings and zero count as "not filled in"
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
            FieldValue::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub real_age_before: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub real_age_after: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub bot_age_before: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub bot_age_after: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub weight_before: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub weight_after: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub height_before: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub height_after: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub gender: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub skin_type: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub procedures: Option<FieldValue>,
    #[serde(alias = "commentBefore", default, deserialize_with = "lenient_field")]
    pub comments_before: Option<FieldValue>,
    #[serde(alias = "commentAfter", default, deserialize_with = "lenient_field")]
    pub comments_after: Option<FieldValue>,
}

impl UserInfo {
    /// Fill every unset field from `other`
    pub fn or(self, other: UserInfo) -> UserInfo {
        UserInfo {
            username: self.username.or(other.username),
            real_age_before: self.real_age_before.or(other.real_age_before),
            real_age_after: self.real_age_after.or(other.real_age_after),
            bot_age_before: self.bot_age_before.or(other.bot_age_before),
            bot_age_after: self.bot_age_after.or(other.bot_age_after),
            weight_before: self.weight_before.or(other.weight_before),
            weight_after: self.weight_after.or(other.weight_after),
            height_before: self.height_before.or(other.height_before),
            height_after: self.height_after.or(other.height_after),
            gender: self.gender.or(other.gender),
            skin_type: self.skin_type.or(other.skin_type),
            procedures: self.procedures.or(other.procedures),
            comments_before: self.comments_before.or(other.comments_before),
            comments_after: self.comments_after.or(other.comments_after),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Body of `POST /api/create-collage`.
///
/// Older web clients post flat `beforePhotos`/`afterPhotos` arrays with the
/// questionnaire fields at the top level; those are folded into `rows` and
/// `userInfo` by [`CollageRequest::into_parts`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollageRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<PhotoRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: CollageMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_info: UserInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub before_photos: Vec<Option<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub after_photos: Vec<Option<String>>,
    #[serde(flatten)]
    pub legacy_user_info: UserInfo,
}

impl CollageRequest {
    pub fn into_parts(self) -> (Vec<PhotoRow>, CollageMetadata, UserInfo) {
        let rows = if self.rows.is_empty() {
            zip_legacy_rows(self.before_photos, self.after_photos)
        } else {
            self.rows
        };
        let user_info = self.user_info.or(self.legacy_user_info);

        (rows, self.metadata, user_info)
    }
}

fn zip_legacy_rows(before: Vec<Option<String>>, after: Vec<Option<String>>) -> Vec<PhotoRow> {
    let count = before.len().max(after.len());
    let mut before = before.into_iter();
    let mut after = after.into_iter();

    (0..count)
        .map(|index| PhotoRow {
            before_photo: before.next().flatten(),
            after_photo: after.next().flatten(),
            photo_type: Some(index.to_string()),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct CollageResponse {
    pub success: bool,
    pub collage: String,
}

/// Accepts a string, ignores anything else instead of failing the whole body
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Numbers and strings are kept; booleans, arrays and objects count as unset
fn lenient_field<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(FieldValue::Number(n)),
        Some(serde_json::Value::String(s)) => Some(FieldValue::Text(s)),
        _ => None,
    })
}

/// EXIF blocks that are not objects are treated as missing
fn lenient_exif<'de, D>(deserializer: D) -> Result<Option<ExifData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// `null` sections behave like omitted ones
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drops `null` entries instead of rejecting the whole map
fn lenient_entries<'de, D>(deserializer: D) -> Result<HashMap<String, PhotoMetadataEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<HashMap<String, Option<PhotoMetadataEntry>>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(photo_type, entry)| entry.map(|entry| (photo_type, entry)))
        .collect())
}

/// Photo type tags arrive as strings ("front") or as indices (0..5)
fn lenient_tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
