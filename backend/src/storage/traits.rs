//! # Storage Traits
//!
//! This module defines the storage abstraction that lets the domain layer
//! work against different key-value backends interchangeably.

use anyhow::Result;
use async_trait::async_trait;

/// Raw string key-value store, the role a mobile platform's preferences
/// API plays for the app.
///
/// Values are opaque strings; JSON encoding happens one layer up in
/// [`StorageService`](super::StorageService).
#[async_trait]
pub trait Preferences: Send + Sync {
    /// Read the value stored under `key`, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;

    /// List stored keys in sorted order
    async fn keys(&self) -> Result<Vec<String>>;
}
