//! # REST API for App Settings

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use shared::AppSettingsUpdate;

use super::error_response;
use crate::AppState;

/// Create a router for settings related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/settings");

    match state.settings_service.get_settings().await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<AppSettingsUpdate>,
) -> impl IntoResponse {
    info!("PUT /api/settings - request: {:?}", update);

    match state.settings_service.update_settings(update).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(&e),
    }
}
