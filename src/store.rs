use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreBackend;
use crate::db::repository::SqliteStore;
use crate::models::{Lesson, LessonResource, LessonRow, NewLessonResource};
use crate::supabase::SupabaseHttpStore;

/// Server-assigned row id. SQLite rows use uuid text; a hosted store may
/// hand back integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

/// What an insert did. `Conflict` means the row's natural key was already
/// taken and nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Conflict,
}

/// The remote tables `lessons` and `lesson_resources`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_lesson_id(&self, day_index: u32) -> Result<Option<RecordId>, StoreError>;
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<InsertOutcome, StoreError>;
    async fn find_resource_id(
        &self,
        lesson_id: &RecordId,
        title: &str,
    ) -> Result<Option<RecordId>, StoreError>;
    async fn insert_resource(
        &self,
        resource: &NewLessonResource,
    ) -> Result<InsertOutcome, StoreError>;
    async fn list_lessons(&self) -> Result<Vec<LessonRow>, StoreError>;
    async fn list_resources(&self, lesson_id: &RecordId)
    -> Result<Vec<LessonResource>, StoreError>;
}

pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn ContentStore>, StoreError> {
    match backend {
        StoreBackend::Supabase(config) => {
            Ok(Arc::new(SupabaseHttpStore::new(config.clone())?))
        }
        StoreBackend::Sqlite { database_url } => {
            Ok(Arc::new(SqliteStore::connect(database_url).await?))
        }
    }
}
