//! # IO Module
//!
//! Interface layer between HTTP clients and the domain services.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: REST endpoints for visits, reviews, saved rooms,
//!   images, backups and settings
//! - **Error Translation**: Domain errors become HTTP status codes
//! - **Serialization**: JSON in and out through serde
//!
//! No business logic lives here; handlers translate and delegate.

pub mod rest;

pub use rest::error_response;
