//! # REST API for Backups
//!
//! Export and import endpoints, plus the wipe-everything endpoint.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use log::info;
use serde::Deserialize;

use shared::ExportData;

use super::error_response;
use crate::AppState;

/// Create a router for backup related APIs. Paths are relative to `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(export_data))
        .route("/export/visits.csv", get(export_visits_csv))
        .route("/import", post(import_data))
        .route("/data", delete(clear_all_data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    /// Indent the snapshot for people reading the file
    pub pretty: bool,
}

/// Full JSON snapshot of visits and saved rooms
pub async fn export_data(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    info!("GET /api/export - pretty: {}", query.pretty);

    if query.pretty {
        return match state.backup_service.export_json().await {
            Ok(json) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
                .into_response(),
            Err(e) => error_response(&e),
        };
    }

    match state.backup_service.export_data().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn export_visits_csv(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/export/visits.csv");

    match state.backup_service.export_visits_csv().await {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"visits.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Merge a snapshot into the stored data
pub async fn import_data(
    State(state): State<AppState>,
    Json(data): Json<ExportData>,
) -> impl IntoResponse {
    info!(
        "POST /api/import - {} visits, {} saved rooms",
        data.visits.len(),
        data.saved_rooms.len()
    );

    match state.backup_service.import_data(data).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Remove every stored collection and the settings
pub async fn clear_all_data(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/data");

    match state.data_service.clear_all().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}
