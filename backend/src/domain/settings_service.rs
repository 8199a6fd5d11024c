use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

use shared::{AppSettings, AppSettingsUpdate, ValidationError};

use super::errors::DataError;
use crate::storage::{Preferences, StorageService};

pub const SETTINGS_KEY: &str = "settings";

/// Service for reading and updating app settings
pub struct SettingsService<P: Preferences> {
    storage: Arc<StorageService<P>>,
    update_lock: Arc<Mutex<()>>,
}

impl<P: Preferences> Clone for SettingsService<P> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            update_lock: Arc::clone(&self.update_lock),
        }
    }
}

impl<P: Preferences> SettingsService<P> {
    pub fn new(storage: Arc<StorageService<P>>) -> Self {
        Self {
            storage,
            update_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Stored settings, or the defaults when none were saved yet
    pub async fn get_settings(&self) -> Result<AppSettings> {
        self.storage
            .get::<AppSettings>(SETTINGS_KEY)
            .await
            .map(Option::unwrap_or_default)
            .inspect_err(|e| error!("Error loading settings: {:#}", e))
            .context("Failed to retrieve settings")
    }

    pub async fn update_settings(&self, update: AppSettingsUpdate) -> Result<AppSettings> {
        info!("Updating settings: {:?}", update);

        let result: Result<AppSettings> = async {
            if let Some(rating) = update.default_rating {
                if !(1..=5).contains(&rating) {
                    return Err(DataError::Invalid(vec![ValidationError::new(
                        "defaultRating",
                        "Rating must be between 1 and 5",
                    )])
                    .into());
                }
            }

            let _guard = self.update_lock.lock().await;
            let mut settings = self
                .storage
                .get::<AppSettings>(SETTINGS_KEY)
                .await?
                .unwrap_or_default();

            if let Some(theme) = update.theme {
                settings.theme = theme;
            }
            if let Some(rating) = update.default_rating {
                settings.default_rating = rating;
            }
            if let Some(quality) = update.image_quality {
                settings.image_quality = quality;
            }
            if let Some(enable_haptics) = update.enable_haptics {
                settings.enable_haptics = enable_haptics;
            }
            if let Some(auto_backup) = update.auto_backup {
                settings.auto_backup = auto_backup;
            }

            self.storage.set(SETTINGS_KEY, &settings).await?;
            Ok(settings)
        }
        .await;

        result
            .inspect_err(|e| error!("Error updating settings: {:#}", e))
            .context("Failed to update settings")
    }
}
