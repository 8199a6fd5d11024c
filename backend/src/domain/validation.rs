//! Field-level validation for visits, reviews and saved rooms.
//!
//! Rules run in a fixed order and every failing rule contributes one
//! [`ValidationError`]. Length limits apply to trimmed text and count
//! characters, not bytes.

use chrono::{DateTime, Utc};
use shared::{
    Priority, ReviewDraft, ReviewFormData, SavedRoomDraft, ValidationError, ValidationResult,
    VisitDraft,
};

use super::errors::DataError;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 2000;
pub const MAX_MEMO_LENGTH: usize = 1000;
pub const MAX_REVIEW_IMAGES: usize = 10;
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Stateless validation rules
pub struct ValidationService;

impl ValidationService {
    pub fn validate_visit(visit: &VisitDraft) -> ValidationResult {
        Self::validate_visit_at(visit, Utc::now())
    }

    /// Validate a visit with an explicit notion of "now"
    pub fn validate_visit_at(visit: &VisitDraft, now: DateTime<Utc>) -> ValidationResult {
        let mut errors = Vec::new();

        check_name(&mut errors, "storeName", "Store name", visit.store_name.as_deref());
        check_name(&mut errors, "themeName", "Theme name", visit.theme_name.as_deref());

        match visit.visit_date {
            None => errors.push(ValidationError::new("visitDate", "Visit date is required")),
            Some(date) if date > now => errors.push(ValidationError::new(
                "visitDate",
                "Visit date cannot be in the future",
            )),
            Some(_) => {}
        }

        if visit.cleared.is_none() {
            errors.push(ValidationError::new("cleared", "Completion status is required"));
        }

        ValidationResult::from_errors(errors)
    }

    pub fn validate_review(review: &ReviewDraft) -> ValidationResult {
        let mut errors = Vec::new();

        if is_blank(review.visit_id.as_deref()) {
            errors.push(ValidationError::new("visitId", "Visit ID is required"));
        }

        match review.rating {
            None => errors.push(ValidationError::new("rating", "Rating is required")),
            Some(rating) if rating == 0.0 || rating.is_nan() => {
                errors.push(ValidationError::new("rating", "Rating is required"))
            }
            Some(rating) if !(MIN_RATING..=MAX_RATING).contains(&rating) => errors.push(
                ValidationError::new("rating", "Rating must be between 1 and 5"),
            ),
            Some(rating) if rating.fract() != 0.0 => {
                errors.push(ValidationError::new("rating", "Rating must be a whole number"))
            }
            Some(_) => {}
        }

        check_text(
            &mut errors,
            "comment",
            review.comment.as_deref(),
            "Comment is required",
            MAX_COMMENT_LENGTH,
            "Comment must be less than 2000 characters",
        );

        if let Some(images) = &review.images {
            if images.len() > MAX_REVIEW_IMAGES {
                errors.push(ValidationError::new(
                    "images",
                    "Maximum 10 images allowed per review",
                ));
            }
        }

        ValidationResult::from_errors(errors)
    }

    pub fn validate_saved_room(saved_room: &SavedRoomDraft) -> ValidationResult {
        let mut errors = Vec::new();

        check_name(&mut errors, "storeName", "Store name", saved_room.store_name.as_deref());
        check_name(&mut errors, "themeName", "Theme name", saved_room.theme_name.as_deref());

        check_text(
            &mut errors,
            "memo",
            saved_room.memo.as_deref(),
            "Memo is required",
            MAX_MEMO_LENGTH,
            "Memo must be less than 1000 characters",
        );

        let priority_ok = saved_room
            .priority
            .as_deref()
            .map(|p| p.parse::<Priority>().is_ok())
            .unwrap_or(false);
        if !priority_ok {
            errors.push(ValidationError::new(
                "priority",
                "Priority must be low, medium, or high",
            ));
        }

        ValidationResult::from_errors(errors)
    }

    /// Check a raw review form, image paths included, and convert it once it
    /// passes
    pub fn review_form(draft: ReviewDraft) -> Result<ReviewFormData, DataError> {
        let validation = Self::validate_review(&draft).merge(Self::validate_image_paths(
            draft.images.as_deref().unwrap_or_default(),
        ));
        if !validation.is_valid {
            return Err(DataError::Invalid(validation.errors));
        }

        Ok(ReviewFormData {
            visit_id: draft.visit_id.unwrap_or_default(),
            // Whole and within 1..=5 once validated
            rating: draft.rating.unwrap_or(MIN_RATING) as u8,
            comment: draft.comment.unwrap_or_default(),
            images: draft.images.unwrap_or_default(),
        })
    }

    /// Trim and collapse internal whitespace runs to a single space
    pub fn sanitize_string(input: &str) -> String {
        input.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn is_valid_image_path(path: &str) -> bool {
        let lower = path.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }

    pub fn validate_image_paths(paths: &[String]) -> ValidationResult {
        let errors = paths
            .iter()
            .enumerate()
            .filter(|(_, path)| !Self::is_valid_image_path(path))
            .map(|(index, _)| {
                ValidationError::new(
                    format!("images[{}]", index),
                    "Invalid image file format. Supported formats: jpg, jpeg, png, gif, webp",
                )
            })
            .collect();

        ValidationResult::from_errors(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn check_name(errors: &mut Vec<ValidationError>, field: &str, label: &str, value: Option<&str>) {
    check_text(
        errors,
        field,
        value,
        &format!("{} is required", label),
        MAX_NAME_LENGTH,
        &format!("{} must be less than 100 characters", label),
    );
}

fn check_text(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Option<&str>,
    required_message: &str,
    max_length: usize,
    too_long_message: &str,
) {
    match value {
        Some(v) if !v.trim().is_empty() => {
            if char_len(v) > max_length {
                errors.push(ValidationError::new(field, too_long_message));
            }
        }
        _ => errors.push(ValidationError::new(field, required_message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn visit_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    fn valid_visit() -> VisitDraft {
        VisitDraft {
            store_name: Some("Escape Room Central".to_string()),
            theme_name: Some("The Haunted Mansion".to_string()),
            visit_date: Some(visit_date()),
            cleared: Some(true),
        }
    }

    fn valid_review() -> ReviewDraft {
        ReviewDraft {
            visit_id: Some("visit-123".to_string()),
            rating: Some(4.0),
            comment: Some("Great escape room with challenging puzzles!".to_string()),
            images: Some(vec!["image1.jpg".to_string(), "image2.png".to_string()]),
        }
    }

    fn valid_saved_room() -> SavedRoomDraft {
        SavedRoomDraft {
            store_name: Some("Future Escape".to_string()),
            theme_name: Some("Time Travel".to_string()),
            memo: Some("Want to try this one next!".to_string()),
            priority: Some("high".to_string()),
        }
    }

    fn has_error(result: &ValidationResult, field: &str, message: &str) -> bool {
        result.errors.contains(&ValidationError::new(field, message))
    }

    #[test]
    fn test_valid_visit() {
        let result = ValidationService::validate_visit(&valid_visit());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_visit_missing_and_blank_store_name() {
        let mut visit = valid_visit();
        visit.store_name = None;
        let result = ValidationService::validate_visit(&visit);
        assert!(!result.is_valid);
        assert!(has_error(&result, "storeName", "Store name is required"));

        visit.store_name = Some("   ".to_string());
        let result = ValidationService::validate_visit(&visit);
        assert!(has_error(&result, "storeName", "Store name is required"));
    }

    #[test]
    fn test_visit_name_length_limits() {
        let mut visit = valid_visit();
        visit.theme_name = Some("x".repeat(101));
        let result = ValidationService::validate_visit(&visit);
        assert!(has_error(&result, "themeName", "Theme name must be less than 100 characters"));

        // Exactly 100 is allowed, and surrounding whitespace does not count
        visit.theme_name = Some(format!("  {}  ", "x".repeat(100)));
        assert!(ValidationService::validate_visit(&visit).is_valid);

        // Multi-byte characters count once each
        visit.theme_name = Some("방".repeat(100));
        assert!(ValidationService::validate_visit(&visit).is_valid);
    }

    #[test]
    fn test_visit_future_date() {
        let now = visit_date();
        let mut visit = valid_visit();
        visit.visit_date = Some(now + Duration::days(1));

        let result = ValidationService::validate_visit_at(&visit, now);
        assert!(!result.is_valid);
        assert!(has_error(&result, "visitDate", "Visit date cannot be in the future"));

        visit.visit_date = Some(now);
        assert!(ValidationService::validate_visit_at(&visit, now).is_valid);
    }

    #[test]
    fn test_visit_missing_date_and_completion_status() {
        let mut visit = valid_visit();
        visit.visit_date = None;
        visit.cleared = None;

        let result = ValidationService::validate_visit(&visit);
        assert_eq!(
            result.errors,
            vec![
                ValidationError::new("visitDate", "Visit date is required"),
                ValidationError::new("cleared", "Completion status is required"),
            ]
        );
    }

    #[test]
    fn test_empty_visit_reports_every_field_in_order() {
        let result = ValidationService::validate_visit(&VisitDraft::default());
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["storeName", "themeName", "visitDate", "cleared"]);
    }

    #[test]
    fn test_valid_review() {
        let result = ValidationService::validate_review(&valid_review());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_review_rating_rules() {
        let cases = [
            (None, "Rating is required"),
            (Some(0.0), "Rating is required"),
            (Some(f64::NAN), "Rating is required"),
            (Some(6.0), "Rating must be between 1 and 5"),
            (Some(-1.0), "Rating must be between 1 and 5"),
            (Some(3.5), "Rating must be a whole number"),
        ];

        for (rating, message) in cases {
            let mut review = valid_review();
            review.rating = rating;
            let result = ValidationService::validate_review(&review);
            assert_eq!(
                result.errors,
                vec![ValidationError::new("rating", message)],
                "rating {:?}",
                rating
            );
        }

        for rating in [1.0, 5.0] {
            let mut review = valid_review();
            review.rating = Some(rating);
            assert!(ValidationService::validate_review(&review).is_valid);
        }
    }

    #[test]
    fn test_review_visit_id_and_comment() {
        let mut review = valid_review();
        review.visit_id = Some(" ".to_string());
        review.comment = None;
        let result = ValidationService::validate_review(&review);
        assert!(has_error(&result, "visitId", "Visit ID is required"));
        assert!(has_error(&result, "comment", "Comment is required"));

        review.visit_id = Some("visit-123".to_string());
        review.comment = Some("a".repeat(2001));
        let result = ValidationService::validate_review(&review);
        assert_eq!(
            result.errors,
            vec![ValidationError::new("comment", "Comment must be less than 2000 characters")]
        );
    }

    #[test]
    fn test_review_image_limit() {
        let mut review = valid_review();
        review.images = Some((0..11).map(|i| format!("image{}.jpg", i)).collect());
        let result = ValidationService::validate_review(&review);
        assert!(has_error(&result, "images", "Maximum 10 images allowed per review"));

        review.images = Some((0..10).map(|i| format!("image{}.jpg", i)).collect());
        assert!(ValidationService::validate_review(&review).is_valid);

        review.images = None;
        assert!(ValidationService::validate_review(&review).is_valid);
    }

    #[test]
    fn test_valid_saved_room() {
        assert!(ValidationService::validate_saved_room(&valid_saved_room()).is_valid);
    }

    #[test]
    fn test_saved_room_memo_and_priority() {
        let mut room = valid_saved_room();
        room.memo = Some("".to_string());
        room.priority = Some("urgent".to_string());
        let result = ValidationService::validate_saved_room(&room);
        assert_eq!(
            result.errors,
            vec![
                ValidationError::new("memo", "Memo is required"),
                ValidationError::new("priority", "Priority must be low, medium, or high"),
            ]
        );

        room.memo = Some("m".repeat(1001));
        room.priority = None;
        let result = ValidationService::validate_saved_room(&room);
        assert!(has_error(&result, "memo", "Memo must be less than 1000 characters"));
        assert!(has_error(&result, "priority", "Priority must be low, medium, or high"));
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(ValidationService::sanitize_string("  Escape   Room \n Central "), "Escape Room Central");
        assert_eq!(ValidationService::sanitize_string("   "), "");
    }

    #[test]
    fn test_image_paths() {
        assert!(ValidationService::is_valid_image_path("photo.JPG"));
        assert!(ValidationService::is_valid_image_path("dir/photo.webp"));
        assert!(!ValidationService::is_valid_image_path("notes.txt"));
        assert!(!ValidationService::is_valid_image_path("jpg"));

        let paths = vec![
            "ok.png".to_string(),
            "bad.bmp".to_string(),
            "ok.jpeg".to_string(),
            "bad".to_string(),
        ];
        let result = ValidationService::validate_image_paths(&paths);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["images[1]", "images[3]"]);
        assert_eq!(
            result.errors[0].message,
            "Invalid image file format. Supported formats: jpg, jpeg, png, gif, webp"
        );
    }

    #[test]
    fn test_review_form_from_draft() {
        let form = ValidationService::review_form(valid_review()).expect("draft should be valid");
        assert_eq!(form.visit_id, "visit-123");
        assert_eq!(form.rating, 4);
        assert_eq!(form.images.len(), 2);

        let mut fractional = valid_review();
        fractional.rating = Some(3.5);
        match ValidationService::review_form(fractional) {
            Err(DataError::Invalid(errors)) => assert_eq!(
                errors,
                vec![ValidationError::new("rating", "Rating must be a whole number")]
            ),
            other => panic!("expected invalid draft, got {:?}", other),
        }

        let mut huge = valid_review();
        huge.rating = Some(9000.0);
        huge.images = Some(vec!["notes.txt".to_string()]);
        match ValidationService::review_form(huge) {
            Err(DataError::Invalid(errors)) => {
                assert_eq!(errors[0].message, "Rating must be between 1 and 5");
                assert_eq!(errors[1].field, "images[0]");
            }
            other => panic!("expected invalid draft, got {:?}", other),
        }
    }
}
