//! # File Preferences
//!
//! A file-based [`Preferences`] implementation: one file per key inside a
//! single directory.
//!
//! ## File Structure
//!
//! ```text
//! escape-room-tracker/
//! └── preferences/
//!     ├── visits.json       ← whole visit array
//!     ├── savedRooms.json   ← whole saved room array
//!     └── settings.json
//! ```
//!
//! Writes go to a temp file first and are renamed into place.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::traits::Preferences;

const VALUE_EXTENSION: &str = "json";

/// Directory-backed key-value store
#[derive(Clone, Debug)]
pub struct FilePreferences {
    directory: PathBuf,
}

impl FilePreferences {
    /// Create preferences stored in `directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).with_context(|| {
                format!("Failed to create preferences directory {}", directory.display())
            })?;
            info!("Created preferences directory: {}", directory.display());
        }

        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Map a key to its file, rejecting keys that could escape the directory
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && !key.contains("..");

        if !valid {
            return Err(anyhow::anyhow!("Invalid preferences key: '{}'", key));
        }

        Ok(self.directory.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

#[async_trait]
impl Preferences for FilePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value for key {}", key);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;

        debug!("Stored {} bytes under key {}", value.len(), key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed key {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    async fn clear(&self) -> Result<()> {
        let keys = self.keys().await?;
        for key in &keys {
            self.remove(key).await?;
        }

        info!("Cleared {} preference keys", keys.len());
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}
