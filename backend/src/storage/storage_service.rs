//! # Storage Service
//!
//! JSON layer over a [`Preferences`] backend. Every value is stored as its
//! serialized JSON text, and every failure is logged and re-raised with a
//! message naming the key involved.

use anyhow::{Context, Result};
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::Preferences;

#[derive(Clone, Debug)]
pub struct StorageService<P: Preferences> {
    preferences: P,
}

impl<P: Preferences> StorageService<P> {
    pub fn new(preferences: P) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    /// Read and deserialize the value under `key`, `None` when absent
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let result: Result<Option<T>> = async {
            match self.preferences.get(key).await? {
                Some(raw) => Ok(Some(serde_json::from_str::<T>(&raw)?)),
                None => Ok(None),
            }
        }
        .await;

        result
            .inspect_err(|e| error!("Error getting value for key {}: {:#}", key, e))
            .with_context(|| format!("Failed to retrieve data for key: {}", key))
    }

    /// Serialize `value` and store it under `key`
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let result: Result<()> = async {
            let raw = serde_json::to_string(value)?;
            self.preferences.set(key, &raw).await
        }
        .await;

        result
            .inspect_err(|e| error!("Error setting value for key {}: {:#}", key, e))
            .with_context(|| format!("Failed to store data for key: {}", key))
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.preferences
            .remove(key)
            .await
            .inspect_err(|e| error!("Error removing key {}: {:#}", key, e))
            .with_context(|| format!("Failed to remove data for key: {}", key))
    }

    pub async fn clear(&self) -> Result<()> {
        self.preferences
            .clear()
            .await
            .inspect_err(|e| error!("Error clearing storage: {:#}", e))
            .context("Failed to clear storage")
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        self.preferences
            .keys()
            .await
            .inspect_err(|e| error!("Error listing storage keys: {:#}", e))
            .context("Failed to list storage keys")
    }
}
