//! # REST API for Saved Rooms
//!
//! Endpoints for the wish list of rooms not yet visited.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;

use shared::{RecordKind, SavedRoomDraft, SavedRoomFormData, SavedRoomUpdate, SearchRequest};

use super::{error_message, error_response};
use crate::domain::{DataError, ValidationService};
use crate::AppState;

/// Create a router for saved room related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_saved_rooms).post(create_saved_room))
        .route("/validate", post(validate_saved_room))
        .route("/search", post(search_saved_rooms))
        .route(
            "/:id",
            get(get_saved_room).put(update_saved_room).delete(delete_saved_room),
        )
}

pub async fn list_saved_rooms(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/saved-rooms");

    match state.data_service.get_saved_rooms().await {
        Ok(rooms) => (StatusCode::OK, Json(rooms)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn get_saved_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/saved-rooms/{}", room_id);

    match state.data_service.get_saved_room(&room_id).await {
        Ok(Some(room)) => (StatusCode::OK, Json(room)).into_response(),
        Ok(None) => error_message(
            StatusCode::NOT_FOUND,
            DataError::not_found(RecordKind::SavedRoom, &room_id).to_string(),
        ),
        Err(e) => error_response(&e),
    }
}

pub async fn create_saved_room(
    State(state): State<AppState>,
    Json(form): Json<SavedRoomFormData>,
) -> impl IntoResponse {
    info!("POST /api/saved-rooms - request: {:?}", form);

    match state.data_service.create_saved_room(form).await {
        Ok(room) => (StatusCode::CREATED, Json(room)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn update_saved_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(update): Json<SavedRoomUpdate>,
) -> impl IntoResponse {
    info!("PUT /api/saved-rooms/{} - request: {:?}", room_id, update);

    match state.data_service.update_saved_room(&room_id, update).await {
        Ok(room) => (StatusCode::OK, Json(room)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn delete_saved_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/saved-rooms/{}", room_id);

    match state.data_service.delete_saved_room(&room_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn validate_saved_room(Json(draft): Json<SavedRoomDraft>) -> impl IntoResponse {
    info!("POST /api/saved-rooms/validate - request: {:?}", draft);
    Json(ValidationService::validate_saved_room(&draft))
}

pub async fn search_saved_rooms(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    info!("POST /api/saved-rooms/search - request: {:?}", request);

    match state
        .data_service
        .search_saved_rooms(&request.filters, request.sort, request.pagination)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => error_response(&e),
    }
}
