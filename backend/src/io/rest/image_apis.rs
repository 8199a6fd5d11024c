//! # REST API for Images
//!
//! Review photos are uploaded as base64 JSON or raw bytes and addressed
//! afterwards by their relative path.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;

use shared::{ImageDataResponse, ImagePathRequest, ImageUploadResult, SaveImageRequest};

use super::error_response;
use crate::AppState;

/// Request body cap for image routes, large enough for full-size camera photos
/// once base64 encoded
pub const MAX_IMAGE_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Create a router for image related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image).get(get_image).delete(delete_image))
        .route("/raw", post(upload_raw_image).get(get_raw_image))
        .route("/thumbnail", post(generate_thumbnail))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BODY_BYTES))
}

/// The requested quality, or the one from the stored image quality setting
async fn upload_quality(state: &AppState, requested: Option<f32>) -> Result<f32> {
    match requested {
        Some(quality) => Ok(quality),
        None => {
            let settings = state.settings_service.get_settings().await?;
            Ok(settings.image_quality.compression_quality())
        }
    }
}

/// Upload base64 image data, optionally as a data URL
pub async fn upload_image(
    State(state): State<AppState>,
    Json(request): Json<SaveImageRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/images - {} base64 chars, quality {:?}",
        request.data.len(),
        request.quality
    );

    let quality = match upload_quality(&state, request.quality).await {
        Ok(quality) => quality,
        Err(e) => return error_response(&e),
    };

    match state.image_service.upload(&request.data, Some(quality)).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Upload raw image bytes
pub async fn upload_raw_image(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    info!("POST /api/images/raw - {} bytes", body.len());

    match state.image_service.save_image_bytes(&body).await {
        Ok(path) => {
            let result = ImageUploadResult {
                path,
                thumbnail_path: None,
                original_size: body.len(),
                compressed_size: None,
            };
            (StatusCode::CREATED, Json(result)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Read an image back as a data URL
pub async fn get_image(
    State(state): State<AppState>,
    Query(request): Query<ImagePathRequest>,
) -> impl IntoResponse {
    info!("GET /api/images?path={}", request.path);

    match state.image_service.get_image(&request.path).await {
        Ok(data_url) => Json(ImageDataResponse {
            path: request.path,
            data_url,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Read an image as decoded JPEG bytes
pub async fn get_raw_image(
    State(state): State<AppState>,
    Query(request): Query<ImagePathRequest>,
) -> impl IntoResponse {
    info!("GET /api/images/raw?path={}", request.path);

    match state.image_service.read_image_bytes(&request.path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn delete_image(
    State(state): State<AppState>,
    Query(request): Query<ImagePathRequest>,
) -> impl IntoResponse {
    info!("DELETE /api/images?path={}", request.path);

    match state.image_service.delete_image(&request.path).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn generate_thumbnail(
    State(state): State<AppState>,
    Json(request): Json<ImagePathRequest>,
) -> impl IntoResponse {
    info!("POST /api/images/thumbnail - path: {}", request.path);

    match state.image_service.generate_thumbnail(&request.path).await {
        Ok(path) => (StatusCode::CREATED, Json(ImagePathRequest { path })).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{send, test_router};
    use super::upload_quality;
    use crate::initialize_backend;
    use crate::storage::test_utils::TestEnvironment;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use shared::{AppSettingsUpdate, ImageQuality};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_upload_read_and_delete() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, upload) = send(
            &app,
            "POST",
            "/api/images",
            Some(json!({ "data": "data:image/png;base64,aGVsbG8=" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(upload["originalSize"], 5);
        let path = upload["path"].as_str().unwrap().to_string();
        assert!(path.starts_with("escape-room-tracker/images/"));
        assert!(upload["thumbnailPath"].as_str().unwrap().ends_with("_thumb.jpg"));

        let (status, image) = send(&app, "GET", &format!("/api/images?path={}", path), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(image["dataUrl"], "data:image/jpeg;base64,aGVsbG8=");

        let request = Request::builder()
            .uri(format!("/api/images/raw?path={}", path))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");

        let (status, _) = send(&app, "DELETE", &format!("/api/images?path={}", path), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &format!("/api/images?path={}", path), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_raw_bytes() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let request = Request::builder()
            .method("POST")
            .uri("/api/images/raw")
            .header(header::CONTENT_TYPE, "image/jpeg")
            .body(Body::from(&b"\xff\xd8\xff"[..]))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, body) = send(&app, "GET", "/api/images?path=../secret.jpg", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Image path must not leave the documents directory: ../secret.jpg"
        );
    }

    #[tokio::test]
    async fn test_paths_outside_image_directory_are_rejected() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let (status, _) = send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({
                "storeName": "Escape Room Central",
                "themeName": "The Haunted Mansion",
                "visitDate": "2024-01-15T00:00:00Z",
                "cleared": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let preferences = "escape-room-tracker/preferences/visits.json";
        let (status, body) =
            send(&app, "DELETE", &format!("/api/images?path={}", preferences), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            format!("Image path must be inside escape-room-tracker/images: {}", preferences)
        );

        let (_, visits) = send(&app, "GET", "/api/visits", None).await;
        assert_eq!(visits.as_array().unwrap().len(), 1);

        std::fs::write(env.base_directory().join("taxes.pdf"), "secret").unwrap();
        let (status, _) = send(&app, "GET", "/api/images?path=taxes.pdf", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/api/images/thumbnail",
            Some(json!({ "path": "escape-room-tracker/preferences/visits.json" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_larger_than_default_body_limit() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let app = test_router(&env);

        let photo = "A".repeat(3 * 1024 * 1024);
        let (status, upload) = send(
            &app,
            "POST",
            "/api/images",
            Some(json!({ "data": format!("data:image/jpeg;base64,{}", photo) })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(upload["originalSize"], 3 * 1024 * 1024 / 4 * 3);

        let request = Request::builder()
            .method("POST")
            .uri("/api/images/raw")
            .header(header::CONTENT_TYPE, "image/jpeg")
            .body(Body::from(vec![0xFFu8; 3 * 1024 * 1024]))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_upload_quality_falls_back_to_settings() {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let state = initialize_backend(&env.config()).expect("Failed to initialize backend");

        assert_eq!(upload_quality(&state, None).await.unwrap(), 0.8);

        state
            .settings_service
            .update_settings(AppSettingsUpdate {
                image_quality: Some(ImageQuality::Low),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(upload_quality(&state, None).await.unwrap(), 0.5);
        assert_eq!(upload_quality(&state, Some(0.9)).await.unwrap(), 0.9);
    }
}
