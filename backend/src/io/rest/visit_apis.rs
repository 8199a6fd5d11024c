//! # REST API for Visits
//!
//! Endpoints for recording, listing, searching, updating and deleting visits.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;

use shared::{RecordKind, SearchRequest, VisitDraft, VisitFormData, VisitUpdate};

use super::{error_message, error_response};
use crate::domain::{DataError, ValidationService};
use crate::AppState;

/// Create a router for visit related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_visits).post(create_visit))
        .route("/validate", post(validate_visit))
        .route("/search", post(search_visits))
        .route("/:id", get(get_visit).put(update_visit).delete(delete_visit))
}

/// List all visits
pub async fn list_visits(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/visits");

    match state.data_service.get_visits().await {
        Ok(visits) => (StatusCode::OK, Json(visits)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Get a visit by ID
pub async fn get_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/visits/{}", visit_id);

    match state.data_service.get_visit(&visit_id).await {
        Ok(Some(visit)) => (StatusCode::OK, Json(visit)).into_response(),
        Ok(None) => error_message(
            StatusCode::NOT_FOUND,
            DataError::not_found(RecordKind::Visit, &visit_id).to_string(),
        ),
        Err(e) => error_response(&e),
    }
}

/// Record a new visit
pub async fn create_visit(
    State(state): State<AppState>,
    Json(form): Json<VisitFormData>,
) -> impl IntoResponse {
    info!("POST /api/visits - request: {:?}", form);

    match state.data_service.create_visit(form).await {
        Ok(visit) => (StatusCode::CREATED, Json(visit)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn update_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<String>,
    Json(update): Json<VisitUpdate>,
) -> impl IntoResponse {
    info!("PUT /api/visits/{} - request: {:?}", visit_id, update);

    match state.data_service.update_visit(&visit_id, update).await {
        Ok(visit) => (StatusCode::OK, Json(visit)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Delete a visit and its review
pub async fn delete_visit(
    State(state): State<AppState>,
    Path(visit_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/visits/{}", visit_id);

    match state.data_service.delete_visit(&visit_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Check a visit form without saving it
pub async fn validate_visit(Json(draft): Json<VisitDraft>) -> impl IntoResponse {
    info!("POST /api/visits/validate - request: {:?}", draft);
    Json(ValidationService::validate_visit(&draft))
}

pub async fn search_visits(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    info!("POST /api/visits/search - request: {:?}", request);

    match state
        .data_service
        .search_visits(&request.filters, request.sort, request.pagination)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{send, test_router};
    use crate::storage::test_utils::TestEnvironment;
    use axum::http::StatusCode;
    use serde_json::json;

    fn visit_body(store: &str) -> serde_json::Value {
        json!({
            "storeName": store,
            "themeName": "The Haunted Mansion",
            "visitDate": "2024-01-15T00:00:00Z",
            "cleared": true
        })
    }

    #[tokio::test]
    async fn test_visit_crud() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, created) = send(&app, "POST", "/api/visits", Some(visit_body("Escape Room Central"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("visit::"));
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let (status, fetched) = send(&app, "GET", &format!("/api/visits/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/visits/{}", id),
            Some(json!({ "cleared": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["cleared"], false);
        assert_eq!(updated["storeName"], "Escape Room Central");

        let (status, list) = send(&app, "GET", "/api/visits", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/api/visits/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", &format!("/api/visits/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("Visit with id {} not found", id));
    }

    #[tokio::test]
    async fn test_update_missing_visit_is_404() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, body) = send(&app, "PUT", "/api/visits/missing", Some(json!({ "cleared": true }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Visit with id missing not found");
    }

    #[tokio::test]
    async fn test_validate_visit() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, body) = send(&app, "POST", "/api/visits/validate", Some(json!({ "storeName": "A" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_visits() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        for store in ["Alpha", "Beta", "Gamma"] {
            send(&app, "POST", "/api/visits", Some(visit_body(store))).await;
        }

        let (status, page) = send(
            &app,
            "POST",
            "/api/visits/search",
            Some(json!({
                "sort": { "field": "storeName", "direction": "desc" },
                "pagination": { "page": 1, "limit": 2 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 3);
        assert_eq!(page["totalPages"], 2);
        assert_eq!(page["hasNextPage"], true);
        assert_eq!(page["items"][0]["storeName"], "Gamma");
        assert_eq!(page["items"][1]["storeName"], "Beta");
    }
}
