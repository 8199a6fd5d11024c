use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recorded escape-room attempt.
///
/// Visit ID format: "visit::<epoch_millis>_<nonce>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub store_name: String,
    pub theme_name: String,
    /// When the room was played (RFC 3339)
    pub visit_date: DateTime<Utc>,
    /// Whether the team escaped
    pub cleared: bool,
    /// Review embedded 1:1 in its visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating, comment and photos attached to exactly one visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub visit_id: String,
    /// Whole number between 1 and 5
    pub rating: u8,
    pub comment: String,
    /// Relative image file paths
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A wish-listed room that has not been visited yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoom {
    pub id: String,
    pub store_name: String,
    pub theme_name: String,
    pub memo: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(PriorityParseError(s.to_string())),
        }
    }
}

/// Text that is not one of the lowercase priority names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority must be low, medium, or high (got {:?})", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

/// Input for creating a visit (generated fields omitted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFormData {
    pub store_name: String,
    pub theme_name: String,
    pub visit_date: DateTime<Utc>,
    pub cleared: bool,
}

/// Input for creating a review on an existing visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFormData {
    pub visit_id: String,
    pub rating: u8,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Input for creating a saved room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoomFormData {
    pub store_name: String,
    pub theme_name: String,
    pub memo: String,
    pub priority: Priority,
}

/// Partially filled visit form, as checked by validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitDraft {
    pub store_name: Option<String>,
    pub theme_name: Option<String>,
    pub visit_date: Option<DateTime<Utc>>,
    pub cleared: Option<bool>,
}

/// Partially filled review form. The rating stays numeric so that
/// fractional input can be reported instead of rejected by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewDraft {
    pub visit_id: Option<String>,
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Partially filled saved room form. Priority is free text until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedRoomDraft {
    pub store_name: Option<String>,
    pub theme_name: Option<String>,
    pub memo: Option<String>,
    pub priority: Option<String>,
}

impl From<&VisitFormData> for VisitDraft {
    fn from(form: &VisitFormData) -> Self {
        Self {
            store_name: Some(form.store_name.clone()),
            theme_name: Some(form.theme_name.clone()),
            visit_date: Some(form.visit_date),
            cleared: Some(form.cleared),
        }
    }
}

impl From<&Visit> for VisitDraft {
    fn from(visit: &Visit) -> Self {
        Self {
            store_name: Some(visit.store_name.clone()),
            theme_name: Some(visit.theme_name.clone()),
            visit_date: Some(visit.visit_date),
            cleared: Some(visit.cleared),
        }
    }
}

impl From<&ReviewFormData> for ReviewDraft {
    fn from(form: &ReviewFormData) -> Self {
        Self {
            visit_id: Some(form.visit_id.clone()),
            rating: Some(f64::from(form.rating)),
            comment: Some(form.comment.clone()),
            images: Some(form.images.clone()),
        }
    }
}

impl From<&Review> for ReviewDraft {
    fn from(review: &Review) -> Self {
        Self {
            visit_id: Some(review.visit_id.clone()),
            rating: Some(f64::from(review.rating)),
            comment: Some(review.comment.clone()),
            images: Some(review.images.clone()),
        }
    }
}

impl From<&SavedRoomFormData> for SavedRoomDraft {
    fn from(form: &SavedRoomFormData) -> Self {
        Self {
            store_name: Some(form.store_name.clone()),
            theme_name: Some(form.theme_name.clone()),
            memo: Some(form.memo.clone()),
            priority: Some(form.priority.as_str().to_string()),
        }
    }
}

impl From<&SavedRoom> for SavedRoomDraft {
    fn from(room: &SavedRoom) -> Self {
        Self {
            store_name: Some(room.store_name.clone()),
            theme_name: Some(room.theme_name.clone()),
            memo: Some(room.memo.clone()),
            priority: Some(room.priority.as_str().to_string()),
        }
    }
}

/// Partial visit update. Reviews are managed through the review operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitUpdate {
    pub store_name: Option<String>,
    pub theme_name: Option<String>,
    pub visit_date: Option<DateTime<Utc>>,
    pub cleared: Option<bool>,
}

/// Partial review update. The owning visit cannot change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedRoomUpdate {
    pub store_name: Option<String>,
    pub theme_name: Option<String>,
    pub memo: Option<String>,
    pub priority: Option<Priority>,
}

/// A single failed field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating one form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Append the errors of another result, keeping rule order
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.is_valid = self.errors.is_empty();
        self
    }
}

/// Filters for searching visits and saved rooms. Fields that do not apply
/// to a collection are ignored for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub search_text: Option<String>,
    pub store_name: Option<String>,
    pub theme_name: Option<String>,
    pub rating: Option<u8>,
    pub cleared: Option<bool>,
    pub priority: Option<Priority>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Date,
    Rating,
    StoreName,
    ThemeName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOptions {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Body of a search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub filters: SearchFilters,
    pub sort: Option<SortOptions>,
    pub pagination: Option<PaginationOptions>,
}

/// Full snapshot of the stored collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub visits: Vec<Visit>,
    pub saved_rooms: Vec<SavedRoom>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub visits_imported: usize,
    pub saved_rooms_imported: usize,
    pub errors: Vec<String>,
}

/// Result of storing an uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResult {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Decoded size in bytes of the submitted image
    pub original_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_size: Option<usize>,
}

/// Request for uploading a base64 image (a data URL prefix is allowed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    pub data: String,
    pub quality: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePathRequest {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDataResponse {
    pub path: String,
    pub data_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    Medium,
    High,
}

impl ImageQuality {
    /// Quality factor handed to image compression
    pub fn compression_quality(&self) -> f32 {
        match self {
            ImageQuality::Low => 0.5,
            ImageQuality::Medium => 0.8,
            ImageQuality::High => 1.0,
        }
    }
}

/// User preferences for the app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    pub default_rating: u8,
    pub image_quality: ImageQuality,
    pub enable_haptics: bool,
    pub auto_backup: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            default_rating: 3,
            image_quality: ImageQuality::Medium,
            enable_haptics: true,
            auto_backup: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettingsUpdate {
    pub theme: Option<Theme>,
    pub default_rating: Option<u8>,
    pub image_quality: Option<ImageQuality>,
    pub enable_haptics: Option<bool>,
    pub auto_backup: Option<bool>,
}

/// Kinds of stored record, used as the ID prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Visit,
    Review,
    SavedRoom,
}

impl RecordKind {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RecordKind::Visit => "visit",
            RecordKind::Review => "review",
            RecordKind::SavedRoom => "room",
        }
    }

    /// Generate a record ID from a timestamp and a random nonce
    pub fn generate_id(&self, epoch_millis: u64, nonce: &str) -> String {
        format!("{}::{}_{}", self.id_prefix(), epoch_millis, nonce)
    }

    /// Parse a record ID and return the embedded timestamp
    pub fn parse_id(&self, id: &str) -> Result<u64, RecordIdError> {
        let (prefix, rest) = id.split_once("::").ok_or(RecordIdError::InvalidFormat)?;
        if prefix != self.id_prefix() {
            return Err(RecordIdError::InvalidFormat);
        }

        let (millis, nonce) = rest.split_once('_').ok_or(RecordIdError::InvalidFormat)?;
        if nonce.is_empty() {
            return Err(RecordIdError::InvalidFormat);
        }

        millis.parse::<u64>().map_err(|_| RecordIdError::InvalidTimestamp)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Visit => write!(f, "Visit"),
            RecordKind::Review => write!(f, "Review"),
            RecordKind::SavedRoom => write!(f, "Saved room"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for RecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIdError::InvalidFormat => write!(f, "Invalid record ID format"),
            RecordIdError::InvalidTimestamp => write!(f, "Invalid timestamp in record ID"),
        }
    }
}

impl std::error::Error for RecordIdError {}
