//! # Storage Module
//!
//! Handles all data persistence for the escape room tracker.
//!
//! ## Key Responsibilities
//!
//! - **Key-Value Storage**: Whole-collection JSON blobs behind the [`Preferences`] trait
//! - **JSON Encoding**: [`StorageService`] serializes values and names the failing key
//! - **Image Files**: [`ImageService`] keeps review photos as base64 files
//!
//! ## Current Implementation
//!
//! - **Primary Storage**: one JSON file per key in the preferences directory
//! - **Images**: `escape-room-tracker/images` under the documents root

pub mod image_service;
pub mod preferences;
pub mod storage_service;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use image_service::{ImagePathError, ImageService};
pub use preferences::FilePreferences;
pub use storage_service::StorageService;
pub use traits::Preferences;
