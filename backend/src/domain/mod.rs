//! # Domain Module
//!
//! Contains the business logic of the escape room tracker.
//!
//! ## Key Responsibilities
//!
//! - **Records**: Visits, the review embedded in each visit, and saved rooms
//! - **Validation**: Field rules with user-facing messages
//! - **Search**: Filtering, sorting and pagination over stored collections
//! - **Backup**: JSON snapshots, CSV export and merging imports
//! - **Settings**: App preferences with defaults
//!
//! Services return `anyhow::Result` with a fixed operation-level message on
//! failure. The typed cause is a [`DataError`] somewhere in the chain.

pub mod backup_service;
pub mod data_service;
pub mod errors;
pub mod query;
pub mod settings_service;
pub mod validation;

pub use backup_service::BackupService;
pub use data_service::DataService;
pub use errors::{data_error, DataError};
pub use settings_service::SettingsService;
pub use validation::ValidationService;
