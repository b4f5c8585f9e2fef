#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use course_backend::db::repository::SqliteStore;
use course_backend::models::{Lesson, LessonResource, LessonRow, NewLessonResource, Resource};
use course_backend::store::{ContentStore, InsertOutcome, RecordId, StoreError};

pub fn lesson(day_index: u32, title: &str) -> Lesson {
    serde_json::from_value(serde_json::json!({
        "day_index": day_index,
        "title": title,
        "topic_slug": "intro",
        "theory": "Rust uses rustup and Cargo."
    }))
    .expect("valid lesson")
}

pub fn resource(day: u32, title: &str) -> Resource {
    Resource {
        lesson_day_index: day,
        title: title.to_string(),
        url: format!("https://example.com/{}", day),
        image_url: String::new(),
    }
}

pub async fn sqlite() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::in_memory().await.expect("Failed to create store"))
}

pub fn content_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("content").join(name)
}

/// Every bundled lesson file, in course order.
pub fn bundled_lesson_files() -> Vec<PathBuf> {
    ["lessons.json", "lessons_6_12.json", "lessons_13_20.json", "lessons_21_30.json"]
        .into_iter()
        .map(content_path)
        .collect()
}

/// Delegates to SQLite but fails every lesson lookup for the listed days,
/// which also fails resources attached to those days.
pub struct FlakyStore {
    pub inner: Arc<SqliteStore>,
    pub broken_days: HashSet<u32>,
}

impl FlakyStore {
    pub fn new(inner: Arc<SqliteStore>, broken_days: impl IntoIterator<Item = u32>) -> Self {
        Self {
            inner,
            broken_days: broken_days.into_iter().collect(),
        }
    }

    fn unavailable(day: u32) -> StoreError {
        StoreError::Api {
            status: 503,
            message: format!("day {} unavailable", day),
        }
    }
}

#[async_trait]
impl ContentStore for FlakyStore {
    async fn find_lesson_id(&self, day_index: u32) -> Result<Option<RecordId>, StoreError> {
        if self.broken_days.contains(&day_index) {
            return Err(Self::unavailable(day_index));
        }
        self.inner.find_lesson_id(day_index).await
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<InsertOutcome, StoreError> {
        self.inner.insert_lesson(lesson).await
    }

    async fn find_resource_id(
        &self,
        lesson_id: &RecordId,
        title: &str,
    ) -> Result<Option<RecordId>, StoreError> {
        self.inner.find_resource_id(lesson_id, title).await
    }

    async fn insert_resource(
        &self,
        resource: &NewLessonResource,
    ) -> Result<InsertOutcome, StoreError> {
        self.inner.insert_resource(resource).await
    }

    async fn list_lessons(&self) -> Result<Vec<LessonRow>, StoreError> {
        self.inner.list_lessons().await
    }

    async fn list_resources(
        &self,
        lesson_id: &RecordId,
    ) -> Result<Vec<LessonResource>, StoreError> {
        self.inner.list_resources(lesson_id).await
    }
}
