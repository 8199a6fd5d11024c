//! Visits, their embedded reviews and saved rooms, persisted as two
//! whole-collection JSON arrays.
//!
//! Every public operation logs its failure and re-raises it under a fixed
//! operation-level message; the root cause (often a [`DataError`]) stays in
//! the error chain.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{
    PaginatedResult, PaginationOptions, RecordKind, Review, ReviewDraft, ReviewFormData,
    ReviewUpdate, SavedRoom, SavedRoomDraft, SavedRoomFormData, SavedRoomUpdate, SearchFilters,
    SortOptions, ValidationResult, Visit, VisitDraft, VisitFormData, VisitUpdate,
};

use super::errors::DataError;
use super::query;
use super::validation::ValidationService;
use crate::storage::{Preferences, StorageService};

pub const VISITS_KEY: &str = "visits";
pub const SAVED_ROOMS_KEY: &str = "savedRooms";

/// Service for managing visits, reviews and saved rooms
pub struct DataService<P: Preferences> {
    storage: Arc<StorageService<P>>,
    /// Serializes read-modify-write sequences on the stored collections
    write_lock: Arc<Mutex<()>>,
}

impl<P: Preferences> Clone for DataService<P> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

/// Generate a record ID with a short random nonce
fn generate_id(kind: RecordKind) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    kind.generate_id(Utc::now().timestamp_millis() as u64, &nonce[..8])
}

fn ensure_valid(result: ValidationResult) -> Result<(), DataError> {
    if result.is_valid {
        Ok(())
    } else {
        Err(DataError::Invalid(result.errors))
    }
}

/// Log a failed operation and wrap it in its public message
fn logged<T>(result: Result<T>, message: &'static str) -> Result<T> {
    result
        .inspect_err(|e| error!("{}: {:#}", message, e))
        .context(message)
}

impl<P: Preferences> DataService<P> {
    pub fn new(storage: Arc<StorageService<P>>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load_visits(&self) -> Result<Vec<Visit>> {
        Ok(self.storage.get(VISITS_KEY).await?.unwrap_or_default())
    }

    async fn load_saved_rooms(&self) -> Result<Vec<SavedRoom>> {
        Ok(self.storage.get(SAVED_ROOMS_KEY).await?.unwrap_or_default())
    }

    // Visit operations

    pub async fn get_visits(&self) -> Result<Vec<Visit>> {
        logged(self.load_visits().await, "Failed to retrieve visits")
    }

    pub async fn get_visit(&self, id: &str) -> Result<Option<Visit>> {
        let visits = self.get_visits().await?;
        Ok(visits.into_iter().find(|v| v.id == id))
    }

    pub async fn create_visit(&self, form: VisitFormData) -> Result<Visit> {
        info!("Creating visit: store={}, theme={}", form.store_name, form.theme_name);

        let result: Result<Visit> = async {
            ensure_valid(ValidationService::validate_visit(&VisitDraft::from(&form)))?;

            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let now = Utc::now();
            let visit = Visit {
                id: generate_id(RecordKind::Visit),
                store_name: ValidationService::sanitize_string(&form.store_name),
                theme_name: ValidationService::sanitize_string(&form.theme_name),
                visit_date: form.visit_date,
                cleared: form.cleared,
                review: None,
                created_at: now,
                updated_at: now,
            };

            visits.push(visit.clone());
            self.storage.set(VISITS_KEY, &visits).await?;

            info!("Created visit: {}", visit.id);
            Ok(visit)
        }
        .await;

        logged(result, "Failed to create visit")
    }

    pub async fn update_visit(&self, id: &str, update: VisitUpdate) -> Result<Visit> {
        info!("Updating visit: {}", id);

        let result: Result<Visit> = async {
            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let visit = visits
                .iter_mut()
                .find(|v| v.id == id)
                .ok_or_else(|| DataError::not_found(RecordKind::Visit, id))?;

            let mut merged = visit.clone();
            if let Some(store_name) = update.store_name {
                merged.store_name = ValidationService::sanitize_string(&store_name);
            }
            if let Some(theme_name) = update.theme_name {
                merged.theme_name = ValidationService::sanitize_string(&theme_name);
            }
            if let Some(visit_date) = update.visit_date {
                merged.visit_date = visit_date;
            }
            if let Some(cleared) = update.cleared {
                merged.cleared = cleared;
            }

            ensure_valid(ValidationService::validate_visit(&VisitDraft::from(&merged)))?;

            merged.updated_at = Utc::now();
            *visit = merged.clone();
            self.storage.set(VISITS_KEY, &visits).await?;

            Ok(merged)
        }
        .await;

        logged(result, "Failed to update visit")
    }

    /// Delete a visit together with its embedded review
    pub async fn delete_visit(&self, id: &str) -> Result<()> {
        info!("Deleting visit: {}", id);

        let result: Result<()> = async {
            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let before = visits.len();
            visits.retain(|v| v.id != id);
            if visits.len() == before {
                return Err(DataError::not_found(RecordKind::Visit, id).into());
            }

            self.storage.set(VISITS_KEY, &visits).await
        }
        .await;

        logged(result, "Failed to delete visit")
    }

    // Review operations

    /// Attach a review to its visit, replacing any review already there
    pub async fn create_review(&self, form: ReviewFormData) -> Result<Review> {
        info!("Creating review for visit: {}", form.visit_id);

        let result: Result<Review> = async {
            let validation = ValidationService::validate_review(&ReviewDraft::from(&form))
                .merge(ValidationService::validate_image_paths(&form.images));
            ensure_valid(validation)?;

            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let visit = visits
                .iter_mut()
                .find(|v| v.id == form.visit_id)
                .ok_or_else(|| DataError::not_found(RecordKind::Visit, &form.visit_id))?;

            if let Some(existing) = &visit.review {
                warn!("Replacing review {} on visit {}", existing.id, visit.id);
            }

            let now = Utc::now();
            let review = Review {
                id: generate_id(RecordKind::Review),
                visit_id: form.visit_id.clone(),
                rating: form.rating,
                comment: form.comment.trim().to_string(),
                images: form.images,
                created_at: now,
                updated_at: now,
            };

            visit.review = Some(review.clone());
            self.storage.set(VISITS_KEY, &visits).await?;

            info!("Created review: {}", review.id);
            Ok(review)
        }
        .await;

        logged(result, "Failed to create review")
    }

    pub async fn update_review(&self, id: &str, update: ReviewUpdate) -> Result<Review> {
        info!("Updating review: {}", id);

        let result: Result<Review> = async {
            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let slot = visits
                .iter_mut()
                .filter_map(|v| v.review.as_mut())
                .find(|r| r.id == id)
                .ok_or_else(|| DataError::not_found(RecordKind::Review, id))?;

            let mut merged = slot.clone();
            if let Some(rating) = update.rating {
                merged.rating = rating;
            }
            if let Some(comment) = update.comment {
                merged.comment = comment.trim().to_string();
            }
            if let Some(images) = update.images {
                merged.images = images;
            }

            let validation = ValidationService::validate_review(&ReviewDraft::from(&merged))
                .merge(ValidationService::validate_image_paths(&merged.images));
            ensure_valid(validation)?;

            merged.updated_at = Utc::now();
            *slot = merged.clone();
            self.storage.set(VISITS_KEY, &visits).await?;

            Ok(merged)
        }
        .await;

        logged(result, "Failed to update review")
    }

    pub async fn delete_review(&self, id: &str) -> Result<()> {
        info!("Deleting review: {}", id);

        let result: Result<()> = async {
            let _guard = self.write_lock.lock().await;
            let mut visits = self.load_visits().await?;

            let visit = visits
                .iter_mut()
                .find(|v| v.review.as_ref().is_some_and(|r| r.id == id))
                .ok_or_else(|| DataError::not_found(RecordKind::Review, id))?;
            visit.review = None;

            self.storage.set(VISITS_KEY, &visits).await
        }
        .await;

        logged(result, "Failed to delete review")
    }

    // Saved room operations

    pub async fn get_saved_rooms(&self) -> Result<Vec<SavedRoom>> {
        logged(self.load_saved_rooms().await, "Failed to retrieve saved rooms")
    }

    pub async fn get_saved_room(&self, id: &str) -> Result<Option<SavedRoom>> {
        let rooms = self.get_saved_rooms().await?;
        Ok(rooms.into_iter().find(|r| r.id == id))
    }

    pub async fn create_saved_room(&self, form: SavedRoomFormData) -> Result<SavedRoom> {
        info!("Creating saved room: store={}, theme={}", form.store_name, form.theme_name);

        let result: Result<SavedRoom> = async {
            ensure_valid(ValidationService::validate_saved_room(&SavedRoomDraft::from(&form)))?;

            let _guard = self.write_lock.lock().await;
            let mut rooms = self.load_saved_rooms().await?;

            let now = Utc::now();
            let room = SavedRoom {
                id: generate_id(RecordKind::SavedRoom),
                store_name: ValidationService::sanitize_string(&form.store_name),
                theme_name: ValidationService::sanitize_string(&form.theme_name),
                memo: form.memo.trim().to_string(),
                priority: form.priority,
                created_at: now,
                updated_at: now,
            };

            rooms.push(room.clone());
            self.storage.set(SAVED_ROOMS_KEY, &rooms).await?;

            info!("Created saved room: {}", room.id);
            Ok(room)
        }
        .await;

        logged(result, "Failed to create saved room")
    }

    pub async fn update_saved_room(&self, id: &str, update: SavedRoomUpdate) -> Result<SavedRoom> {
        info!("Updating saved room: {}", id);

        let result: Result<SavedRoom> = async {
            let _guard = self.write_lock.lock().await;
            let mut rooms = self.load_saved_rooms().await?;

            let room = rooms
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| DataError::not_found(RecordKind::SavedRoom, id))?;

            let mut merged = room.clone();
            if let Some(store_name) = update.store_name {
                merged.store_name = ValidationService::sanitize_string(&store_name);
            }
            if let Some(theme_name) = update.theme_name {
                merged.theme_name = ValidationService::sanitize_string(&theme_name);
            }
            if let Some(memo) = update.memo {
                merged.memo = memo.trim().to_string();
            }
            if let Some(priority) = update.priority {
                merged.priority = priority;
            }

            ensure_valid(ValidationService::validate_saved_room(&SavedRoomDraft::from(&merged)))?;

            merged.updated_at = Utc::now();
            *room = merged.clone();
            self.storage.set(SAVED_ROOMS_KEY, &rooms).await?;

            Ok(merged)
        }
        .await;

        logged(result, "Failed to update saved room")
    }

    pub async fn delete_saved_room(&self, id: &str) -> Result<()> {
        info!("Deleting saved room: {}", id);

        let result: Result<()> = async {
            let _guard = self.write_lock.lock().await;
            let mut rooms = self.load_saved_rooms().await?;

            let before = rooms.len();
            rooms.retain(|r| r.id != id);
            if rooms.len() == before {
                return Err(DataError::not_found(RecordKind::SavedRoom, id).into());
            }

            self.storage.set(SAVED_ROOMS_KEY, &rooms).await
        }
        .await;

        logged(result, "Failed to delete saved room")
    }

    // Search

    pub async fn search_visits(
        &self,
        filters: &SearchFilters,
        sort: Option<SortOptions>,
        pagination: Option<PaginationOptions>,
    ) -> Result<PaginatedResult<Visit>> {
        let visits = self.get_visits().await?;
        Ok(query::search(visits, filters, sort, pagination))
    }

    pub async fn search_saved_rooms(
        &self,
        filters: &SearchFilters,
        sort: Option<SortOptions>,
        pagination: Option<PaginationOptions>,
    ) -> Result<PaginatedResult<SavedRoom>> {
        let rooms = self.get_saved_rooms().await?;
        Ok(query::search(rooms, filters, sort, pagination))
    }

    /// Remove every stored key, settings included
    pub async fn clear_all(&self) -> Result<()> {
        info!("Clearing all stored data");
        let _guard = self.write_lock.lock().await;
        self.storage.clear().await
    }

    /// Load both collections under the write lock, let `apply` change them,
    /// then persist both. Used by bulk operations such as import.
    pub(crate) async fn modify_collections<R>(
        &self,
        apply: impl FnOnce(&mut Vec<Visit>, &mut Vec<SavedRoom>) -> R,
    ) -> Result<R> {
        let _guard = self.write_lock.lock().await;
        let mut visits = self.load_visits().await?;
        let mut rooms = self.load_saved_rooms().await?;

        let outcome = apply(&mut visits, &mut rooms);

        self.storage.set(VISITS_KEY, &visits).await?;
        self.storage.set(SAVED_ROOMS_KEY, &rooms).await?;
        Ok(outcome)
    }
}
