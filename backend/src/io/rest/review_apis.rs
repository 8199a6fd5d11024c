//! # REST API for Reviews
//!
//! Reviews live inside their visit; these endpoints address them by review ID.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{post, put},
    Router,
};
use log::info;

use shared::{ReviewDraft, ReviewUpdate};

use super::error_response;
use crate::domain::ValidationService;
use crate::AppState;

/// Create a router for review related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/validate", post(validate_review))
        .route("/:id", put(update_review).delete(delete_review))
}

/// Attach a review to a visit. The body is read as a draft so that a bad
/// rating is reported as a field error.
pub async fn create_review(
    State(state): State<AppState>,
    Json(draft): Json<ReviewDraft>,
) -> impl IntoResponse {
    info!("POST /api/reviews - request: {:?}", draft);

    let form = match ValidationService::review_form(draft) {
        Ok(form) => form,
        Err(e) => {
            let err = anyhow::Error::from(e).context("Failed to create review");
            return error_response(&err);
        }
    };

    match state.data_service.create_review(form).await {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Json(update): Json<ReviewUpdate>,
) -> impl IntoResponse {
    info!("PUT /api/reviews/{} - request: {:?}", review_id, update);

    match state.data_service.update_review(&review_id, update).await {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/reviews/{}", review_id);

    match state.data_service.delete_review(&review_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Check a review form, including its image paths, without saving it
pub async fn validate_review(Json(draft): Json<ReviewDraft>) -> impl IntoResponse {
    info!("POST /api/reviews/validate - request: {:?}", draft);

    let mut result = ValidationService::validate_review(&draft);
    if let Some(images) = &draft.images {
        result = result.merge(ValidationService::validate_image_paths(images));
    }
    Json(result)
}
