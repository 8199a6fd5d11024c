//! # REST API Interface Layer
//!
//! HTTP endpoints for the escape room tracker. Each `*_apis` module exposes a
//! `router()` that is nested under `/api` by [`crate::create_router`].
//!
//! ## Error Translation
//!
//! | Cause in the error chain | Status |
//! |---|---|
//! | `DataError::NotFound` | 404 |
//! | `DataError::Invalid` | 400, with the field errors |
//! | `ImagePathError` | 400 |
//! | missing image file | 404 |
//! | anything else | 500 |

pub mod backup_apis;
pub mod image_apis;
pub mod review_apis;
pub mod saved_room_apis;
pub mod settings_apis;
pub mod visit_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use shared::ValidationError;

use crate::domain::{data_error, DataError};
use crate::storage::ImagePathError;

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: Vec::new(),
        }
    }
}

/// Build an error response with a plain message
pub fn error_message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// Translate a service error into an HTTP response
pub fn error_response(err: &anyhow::Error) -> Response {
    if let Some(data_err) = data_error(err) {
        return match data_err {
            DataError::NotFound { .. } => error_message(StatusCode::NOT_FOUND, data_err.to_string()),
            DataError::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: err.to_string(),
                    errors: errors.clone(),
                }),
            )
                .into_response(),
        };
    }

    if let Some(path_err) = err.chain().find_map(|c| c.downcast_ref::<ImagePathError>()) {
        return error_message(StatusCode::BAD_REQUEST, path_err.to_string());
    }

    let missing_file = err
        .chain()
        .filter_map(|c| c.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == std::io::ErrorKind::NotFound);
    if missing_file {
        return error_message(StatusCode::NOT_FOUND, err.to_string());
    }

    error_message(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
