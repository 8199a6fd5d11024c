/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// This module provides RAII-based cleanup that guarantees test data is removed
/// even if tests panic or fail.
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::preferences::FilePreferences;
use super::storage_service::StorageService;
use super::traits::Preferences;
use crate::config::AppConfig;

/// RAII Test Environment that automatically cleans up on drop
///
/// The temporary directory plays the role of the device's Documents
/// directory and disappears when the environment goes out of scope.
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    /// Configuration rooted at this environment
    pub fn config(&self) -> AppConfig {
        AppConfig::with_documents_dir(&self.base_path)
    }

    pub fn preferences(&self) -> FilePreferences {
        FilePreferences::new(self.config().preferences_directory())
            .expect("Failed to create test preferences")
    }

    pub fn storage_service(&self) -> StorageService<FilePreferences> {
        StorageService::new(self.preferences())
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        // TempDir cleans up on its own drop
        if std::env::var("ESCAPE_ROOM_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}

/// Preferences backend whose every operation fails, for error-path tests
#[derive(Clone, Debug, Default)]
pub struct FailingPreferences;

#[async_trait]
impl Preferences for FailingPreferences {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow::anyhow!("Storage error"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow::anyhow!("Storage error"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow::anyhow!("Storage error"))
    }

    async fn clear(&self) -> Result<()> {
        Err(anyhow::anyhow!("Storage error"))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Err(anyhow::anyhow!("Storage error"))
    }
}
