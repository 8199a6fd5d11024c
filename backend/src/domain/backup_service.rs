//! Export and import of the stored collections.
//!
//! Exports are full JSON snapshots ([`ExportData`]) or a flat CSV of visits.
//! Imports merge a snapshot into what is stored, skipping and reporting
//! records that clash or fail validation.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;

use shared::{
    ExportData, ImportResult, ReviewDraft, SavedRoom, SavedRoomDraft, Visit, VisitDraft,
};

use super::data_service::DataService;
use super::errors::DataError;
use super::validation::ValidationService;
use crate::storage::Preferences;

pub const EXPORT_VERSION: &str = "1.0.0";

const VISIT_CSV_HEADER: [&str; 7] = [
    "id",
    "store_name",
    "theme_name",
    "visit_date",
    "cleared",
    "rating",
    "comment",
];

/// One visit as a CSV row, in [`VISIT_CSV_HEADER`] order
#[derive(Debug, Serialize)]
struct VisitCsvRow<'a> {
    id: &'a str,
    store_name: &'a str,
    theme_name: &'a str,
    visit_date: String,
    cleared: bool,
    rating: Option<u8>,
    comment: Option<&'a str>,
}

impl<'a> From<&'a Visit> for VisitCsvRow<'a> {
    fn from(visit: &'a Visit) -> Self {
        Self {
            id: &visit.id,
            store_name: &visit.store_name,
            theme_name: &visit.theme_name,
            visit_date: visit.visit_date.to_rfc3339(),
            cleared: visit.cleared,
            rating: visit.review.as_ref().map(|r| r.rating),
            comment: visit.review.as_ref().map(|r| r.comment.as_str()),
        }
    }
}

/// Service for backing up and restoring tracker data
pub struct BackupService<P: Preferences> {
    data_service: DataService<P>,
}

impl<P: Preferences> Clone for BackupService<P> {
    fn clone(&self) -> Self {
        Self {
            data_service: self.data_service.clone(),
        }
    }
}

impl<P: Preferences> BackupService<P> {
    pub fn new(data_service: DataService<P>) -> Self {
        Self { data_service }
    }

    pub async fn export_data(&self) -> Result<ExportData> {
        info!("Exporting all data");

        let result: Result<ExportData> = async {
            let visits = self.data_service.get_visits().await?;
            let saved_rooms = self.data_service.get_saved_rooms().await?;

            info!(
                "Exporting {} visits and {} saved rooms",
                visits.len(),
                saved_rooms.len()
            );

            Ok(ExportData {
                visits,
                saved_rooms,
                export_date: Utc::now(),
                version: EXPORT_VERSION.to_string(),
            })
        }
        .await;

        result
            .inspect_err(|e| error!("Error exporting data: {:#}", e))
            .context("Failed to export data")
    }

    /// Pretty-printed JSON snapshot
    pub async fn export_json(&self) -> Result<String> {
        let data = self.export_data().await?;
        serde_json::to_string_pretty(&data).context("Failed to export data")
    }

    /// Visits as CSV, oldest visit first
    pub async fn export_visits_csv(&self) -> Result<String> {
        info!("Exporting visits as CSV");

        let result: Result<String> = async {
            let mut visits = self.data_service.get_visits().await?;
            visits.sort_by_key(|v| v.visit_date);

            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer.write_record(VISIT_CSV_HEADER)?;
            for visit in &visits {
                writer.serialize(VisitCsvRow::from(visit))?;
            }
            writer.flush()?;

            let bytes = writer.into_inner().map_err(|e| e.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
        .await;

        result
            .inspect_err(|e| error!("Error exporting visits CSV: {:#}", e))
            .context("Failed to export visits")
    }

    /// Merge a snapshot into the stored collections
    pub async fn import_data(&self, data: ExportData) -> Result<ImportResult> {
        info!(
            "Importing {} visits and {} saved rooms (version {})",
            data.visits.len(),
            data.saved_rooms.len(),
            data.version
        );

        let result = self
            .data_service
            .modify_collections(|visits, rooms| merge_snapshot(data, visits, rooms))
            .await;

        result
            .inspect(|r| {
                if !r.errors.is_empty() {
                    warn!("Import skipped {} records", r.errors.len());
                }
            })
            .inspect_err(|e| error!("Error importing data: {:#}", e))
            .context("Failed to import data")
    }
}

fn check_visit(visit: &Visit) -> Result<(), DataError> {
    let mut validation = ValidationService::validate_visit(&VisitDraft::from(visit));

    if let Some(review) = &visit.review {
        if review.visit_id != visit.id {
            return Err(DataError::Invalid(vec![shared::ValidationError::new(
                "visitId",
                "Review belongs to a different visit",
            )]));
        }
        validation = validation
            .merge(ValidationService::validate_review(&ReviewDraft::from(review)))
            .merge(ValidationService::validate_image_paths(&review.images));
    }

    if validation.is_valid {
        Ok(())
    } else {
        Err(DataError::Invalid(validation.errors))
    }
}

fn check_saved_room(room: &SavedRoom) -> Result<(), DataError> {
    let validation = ValidationService::validate_saved_room(&SavedRoomDraft::from(room));
    if validation.is_valid {
        Ok(())
    } else {
        Err(DataError::Invalid(validation.errors))
    }
}

fn merge_snapshot(
    data: ExportData,
    visits: &mut Vec<Visit>,
    rooms: &mut Vec<SavedRoom>,
) -> ImportResult {
    let mut result = ImportResult::default();

    let mut visit_ids: HashSet<String> = visits.iter().map(|v| v.id.clone()).collect();
    let mut review_ids: HashSet<String> = visits
        .iter()
        .filter_map(|v| v.review.as_ref())
        .map(|r| r.id.clone())
        .collect();
    for visit in data.visits {
        if visit_ids.contains(&visit.id) {
            result.errors.push(format!("Visit {}: id already exists", visit.id));
            continue;
        }
        if let Some(review) = visit.review.as_ref().filter(|r| review_ids.contains(&r.id)) {
            result
                .errors
                .push(format!("Visit {}: review id {} already exists", visit.id, review.id));
            continue;
        }
        if let Err(e) = check_visit(&visit) {
            result.errors.push(format!("Visit {}: {}", visit.id, e));
            continue;
        }
        visit_ids.insert(visit.id.clone());
        if let Some(review) = &visit.review {
            review_ids.insert(review.id.clone());
        }
        visits.push(visit);
        result.visits_imported += 1;
    }

    let mut room_ids: HashSet<String> = rooms.iter().map(|r| r.id.clone()).collect();
    for room in data.saved_rooms {
        if room_ids.contains(&room.id) {
            result.errors.push(format!("Saved room {}: id already exists", room.id));
            continue;
        }
        if let Err(e) = check_saved_room(&room) {
            result.errors.push(format!("Saved room {}: {}", room.id, e));
            continue;
        }
        room_ids.insert(room.id.clone());
        rooms.push(room);
        result.saved_rooms_imported += 1;
    }

    result
}
