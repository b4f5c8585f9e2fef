use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Lesson, NewLessonResource, Resource};
use crate::store::{ContentStore, InsertOutcome, StoreError};

/// What to do when the store fails on one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Record the failure and move on to the next record.
    #[default]
    ContinueOnError,
    /// Stop the batch at the first failure.
    FailFast,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub policy: SyncPolicy,
    /// Look up keys but never insert.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Inserted,
    AlreadyExists,
    WouldInsert,
    Orphaned,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub key: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncStats {
    pub inserted: usize,
    pub already_present: usize,
    pub would_insert: usize,
    pub orphaned: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub stats: SyncStats,
    pub records: Vec<RecordReport>,
}

impl SyncReport {
    fn push(&mut self, key: String, outcome: RecordOutcome) {
        match &outcome {
            RecordOutcome::Inserted => self.stats.inserted += 1,
            RecordOutcome::AlreadyExists => self.stats.already_present += 1,
            RecordOutcome::WouldInsert => self.stats.would_insert += 1,
            RecordOutcome::Orphaned => self.stats.orphaned += 1,
            RecordOutcome::Failed { .. } => self.stats.failed += 1,
        }
        self.records.push(RecordReport { key, outcome });
    }

    pub fn has_failures(&self) -> bool {
        self.stats.failed > 0
    }

    pub fn outcome_of(&self, key: &str) -> Option<&RecordOutcome> {
        self.records
            .iter()
            .find(|r| r.key == key)
            .map(|r| &r.outcome)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync aborted at {key}: {source}")]
    Aborted {
        key: String,
        #[source]
        source: StoreError,
    },
}

pub fn lesson_key(day_index: u32) -> String {
    format!("day {}", day_index)
}

pub fn resource_key(resource: &Resource) -> String {
    format!("day {} / {}", resource.lesson_day_index, resource.title)
}

/// Pushes static lessons and resources into the store, once per natural
/// key. Re-running with the same input inserts nothing new and never
/// overwrites existing rows.
pub struct SyncService {
    store: Arc<dyn ContentStore>,
    options: SyncOptions,
}

impl SyncService {
    pub fn new(store: Arc<dyn ContentStore>, options: SyncOptions) -> Self {
        Self { store, options }
    }

    pub async fn sync_lessons(&self, lessons: &[Lesson]) -> Result<SyncReport, SyncError> {
        info!("Syncing {} lessons", lessons.len());
        let mut report = SyncReport::default();

        for lesson in lessons {
            let key = lesson_key(lesson.day_index);
            let result = self.sync_lesson(lesson).await;
            self.record(&mut report, key, result)?;
        }

        info!("Lesson sync finished: {:?}", report.stats);
        Ok(report)
    }

    pub async fn sync_resources(&self, resources: &[Resource]) -> Result<SyncReport, SyncError> {
        info!("Syncing {} resources", resources.len());
        let mut report = SyncReport::default();

        for resource in resources {
            let key = resource_key(resource);
            let result = self.sync_resource(resource).await;
            self.record(&mut report, key, result)?;
        }

        info!("Resource sync finished: {:?}", report.stats);
        Ok(report)
    }

    async fn sync_lesson(&self, lesson: &Lesson) -> Result<RecordOutcome, StoreError> {
        let day = lesson.day_index;

        if self.store.find_lesson_id(day).await?.is_some() {
            info!("Day {} already exists - skipping.", day);
            return Ok(RecordOutcome::AlreadyExists);
        }

        if self.options.dry_run {
            info!("[DRY RUN] Would upload Day {}: {}", day, lesson.title);
            return Ok(RecordOutcome::WouldInsert);
        }

        match self.store.insert_lesson(lesson).await? {
            InsertOutcome::Inserted => {
                info!("Uploaded Day {}: {}", day, lesson.title);
                Ok(RecordOutcome::Inserted)
            }
            InsertOutcome::Conflict => {
                info!("Day {} was created concurrently - skipping.", day);
                Ok(RecordOutcome::AlreadyExists)
            }
        }
    }

    async fn sync_resource(&self, resource: &Resource) -> Result<RecordOutcome, StoreError> {
        let day = resource.lesson_day_index;

        let Some(lesson_id) = self.store.find_lesson_id(day).await? else {
            warn!(
                "No lesson found for day {} - skipping resource '{}'.",
                day, resource.title
            );
            return Ok(RecordOutcome::Orphaned);
        };

        if self
            .store
            .find_resource_id(&lesson_id, &resource.title)
            .await?
            .is_some()
        {
            info!(
                "Resource '{}' already exists for lesson {} - skipping.",
                resource.title, day
            );
            return Ok(RecordOutcome::AlreadyExists);
        }

        if self.options.dry_run {
            info!(
                "[DRY RUN] Would upload resource '{}' for lesson {}",
                resource.title, day
            );
            return Ok(RecordOutcome::WouldInsert);
        }

        let row = NewLessonResource::for_lesson(lesson_id, resource);
        match self.store.insert_resource(&row).await? {
            InsertOutcome::Inserted => {
                info!("Uploaded resource '{}' for lesson {}", resource.title, day);
                Ok(RecordOutcome::Inserted)
            }
            InsertOutcome::Conflict => Ok(RecordOutcome::AlreadyExists),
        }
    }

    fn record(
        &self,
        report: &mut SyncReport,
        key: String,
        result: Result<RecordOutcome, StoreError>,
    ) -> Result<(), SyncError> {
        match result {
            Ok(outcome) => report.push(key, outcome),
            Err(source) if self.options.policy == SyncPolicy::FailFast => {
                return Err(SyncError::Aborted { key, source });
            }
            Err(e) => {
                warn!("Failed to sync {}: {}", key, e);
                report.push(
                    key,
                    RecordOutcome::Failed {
                        error: e.to_string(),
                    },
                );
            }
        }
        Ok(())
    }
}
