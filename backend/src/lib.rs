//! # Escape Room Tracker Backend
//!
//! Contains all non-UI logic for the escape room tracker.
//!
//! The backend brings together:
//! - **Domain**: Visits, reviews, saved rooms, validation, search, backups, settings
//! - **Storage**: Key-value JSON persistence and review image files
//! - **IO**: The REST API exposed to the frontend
//!
//! ## Architecture
//!
//! ```text
//! Frontend
//!     ↓
//! IO Layer (REST API, axum handlers)
//!     ↓
//! Domain Layer (services, validation, queries)
//!     ↓
//! Storage Layer (preferences files, image files)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::domain::{BackupService, DataService, SettingsService};
use crate::io::rest::{
    backup_apis, image_apis, review_apis, saved_room_apis, settings_apis, visit_apis,
};
use crate::storage::{FilePreferences, ImageService, StorageService};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub data_service: DataService<FilePreferences>,
    pub settings_service: SettingsService<FilePreferences>,
    pub backup_service: BackupService<FilePreferences>,
    pub image_service: ImageService,
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.app_directory().display());
    let preferences = FilePreferences::new(config.preferences_directory())?;
    let storage = Arc::new(StorageService::new(preferences));
    let image_service = ImageService::new(&config.documents_dir)?;

    info!("Setting up domain services");
    let data_service = DataService::new(Arc::clone(&storage));
    let settings_service = SettingsService::new(Arc::clone(&storage));
    let backup_service = BackupService::new(data_service.clone());

    Ok(AppState {
        data_service,
        settings_service,
        backup_service,
        image_service,
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    // CORS setup to allow the frontend to make requests
    let origin = config
        .frontend_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid frontend origin: {}", config.frontend_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/visits", visit_apis::router())
        .nest("/reviews", review_apis::router())
        .nest("/saved-rooms", saved_room_apis::router())
        .nest("/images", image_apis::router())
        .nest("/settings", settings_apis::router())
        .merge(backup_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
