use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{Lesson, LessonResource, LessonRow, NewLessonResource};
use crate::store::{ContentStore, InsertOutcome, RecordId, StoreError};

/// `ContentStore` over a local SQLite database, with the natural keys
/// enforced by unique constraints.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

#[derive(Debug, FromRow)]
struct LessonRecord {
    id: String,
    day_index: i64,
    title: String,
    topic_slug: String,
    estimated_time_minutes: Option<i64>,
    theory: String,
    core_example: Option<String>,
    pitfall_example: Option<String>,
    challenge: Option<String>,
}

#[derive(Debug, FromRow)]
struct ResourceRecord {
    id: String,
    lesson_id: String,
    title: String,
    url: String,
    image_url: String,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::migrated(pool).await
    }

    /// A private in-memory database. One connection, so every query sees
    /// the same data.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { db: pool })
    }

    pub async fn count_lessons(&self, day_index: u32) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE day_index = ?")
            .bind(day_index as i64)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_resources(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_resources")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

fn to_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>, StoreError> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode lesson part: {}", e)))
}

fn from_json<T: DeserializeOwned>(raw: Option<String>) -> Result<Option<T>, StoreError> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| StoreError::InvalidResponse(format!("Failed to decode lesson part: {}", e)))
}

impl TryFrom<LessonRecord> for LessonRow {
    type Error = StoreError;

    fn try_from(record: LessonRecord) -> Result<Self, Self::Error> {
        let day_index = u32::try_from(record.day_index).map_err(|_| {
            StoreError::InvalidResponse(format!("day_index out of range: {}", record.day_index))
        })?;

        Ok(LessonRow {
            id: RecordId::Text(record.id),
            lesson: Lesson {
                day_index,
                title: record.title,
                topic_slug: record.topic_slug,
                estimated_time_minutes: record
                    .estimated_time_minutes
                    .and_then(|m| u32::try_from(m).ok()),
                theory: record.theory,
                core_example: from_json(record.core_example)?,
                pitfall_example: from_json(record.pitfall_example)?,
                challenge: from_json(record.challenge)?,
            },
        })
    }
}

impl From<ResourceRecord> for LessonResource {
    fn from(record: ResourceRecord) -> Self {
        LessonResource {
            id: RecordId::Text(record.id),
            lesson_id: RecordId::Text(record.lesson_id),
            title: record.title,
            url: record.url,
            image_url: record.image_url,
        }
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn find_lesson_id(&self, day_index: u32) -> Result<Option<RecordId>, StoreError> {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM lessons WHERE day_index = ?")
            .bind(day_index as i64)
            .fetch_optional(&self.db)
            .await?;
        Ok(id.map(RecordId::Text))
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<InsertOutcome, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let affected = sqlx::query(
            r#"
            INSERT INTO lessons
                (id, day_index, title, topic_slug, estimated_time_minutes, theory,
                core_example, pitfall_example, challenge, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(day_index) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(lesson.day_index as i64)
        .bind(&lesson.title)
        .bind(&lesson.topic_slug)
        .bind(lesson.estimated_time_minutes.map(i64::from))
        .bind(&lesson.theory)
        .bind(to_json(&lesson.core_example)?)
        .bind(to_json(&lesson.pitfall_example)?)
        .bind(to_json(&lesson.challenge)?)
        .bind(&now)
        .execute(&self.db)
        .await?
        .rows_affected();

        Ok(if affected > 0 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Conflict
        })
    }

    async fn find_resource_id(
        &self,
        lesson_id: &RecordId,
        title: &str,
    ) -> Result<Option<RecordId>, StoreError> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM lesson_resources WHERE lesson_id = ? AND title = ?")
                .bind(lesson_id.to_string())
                .bind(title)
                .fetch_optional(&self.db)
                .await?;
        Ok(id.map(RecordId::Text))
    }

    async fn insert_resource(
        &self,
        resource: &NewLessonResource,
    ) -> Result<InsertOutcome, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let affected = sqlx::query(
            r#"
            INSERT INTO lesson_resources (id, lesson_id, title, url, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(lesson_id, title) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(resource.lesson_id.to_string())
        .bind(&resource.title)
        .bind(&resource.url)
        .bind(&resource.image_url)
        .bind(&now)
        .execute(&self.db)
        .await?
        .rows_affected();

        Ok(if affected > 0 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Conflict
        })
    }

    async fn list_lessons(&self) -> Result<Vec<LessonRow>, StoreError> {
        sqlx::query_as::<_, LessonRecord>(
            r#"
            SELECT id, day_index, title, topic_slug, estimated_time_minutes, theory,
                core_example, pitfall_example, challenge
            FROM lessons
            ORDER BY day_index
            "#,
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(LessonRow::try_from)
        .collect()
    }

    async fn list_resources(
        &self,
        lesson_id: &RecordId,
    ) -> Result<Vec<LessonResource>, StoreError> {
        let records = sqlx::query_as::<_, ResourceRecord>(
            r#"
            SELECT id, lesson_id, title, url, image_url
            FROM lesson_resources
            WHERE lesson_id = ?
            ORDER BY title
            "#,
        )
        .bind(lesson_id.to_string())
        .fetch_all(&self.db)
        .await?;
        Ok(records.into_iter().map(LessonResource::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Challenge, CoreExample};

    async fn setup_test_store() -> SqliteStore {
        SqliteStore::in_memory()
            .await
            .expect("Failed to create test store")
    }

    fn lesson(day_index: u32, title: &str) -> Lesson {
        Lesson {
            day_index,
            title: title.to_string(),
            topic_slug: "variables".to_string(),
            estimated_time_minutes: Some(15),
            theory: "Variables are immutable by default.".to_string(),
            core_example: Some(CoreExample {
                code: "let mut score = 10;".to_string(),
                explanation: Some("`mut` allows updates.".to_string()),
                tools_used: Vec::new(),
            }),
            pitfall_example: None,
            challenge: Some(Challenge {
                task: Some("Create one mutable variable.".to_string()),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_lesson() {
        let store = setup_test_store().await;

        let outcome = store
            .insert_lesson(&lesson(2, "Variables & Mutability"))
            .await
            .expect("Failed to insert lesson");
        assert_eq!(outcome, InsertOutcome::Inserted);

        let id = store.find_lesson_id(2).await.expect("Failed to query");
        assert!(id.is_some());
        assert!(store.find_lesson_id(3).await.expect("Failed to query").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_day_index_is_a_conflict() {
        let store = setup_test_store().await;

        store.insert_lesson(&lesson(1, "Intro")).await.unwrap();
        let second = store.insert_lesson(&lesson(1, "Intro again")).await.unwrap();

        assert_eq!(second, InsertOutcome::Conflict);
        assert_eq!(store.count_lessons(1).await.unwrap(), 1);

        let lessons = store.list_lessons().await.unwrap();
        assert_eq!(lessons[0].lesson.title, "Intro");
    }

    #[tokio::test]
    async fn test_list_lessons_round_trips_nested_parts() {
        let store = setup_test_store().await;
        let original = lesson(4, "Functions");
        store.insert_lesson(&original).await.unwrap();

        let lessons = store.list_lessons().await.unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].lesson, original);
    }

    #[tokio::test]
    async fn test_resource_key_is_lesson_and_title() {
        let store = setup_test_store().await;
        store.insert_lesson(&lesson(1, "Intro")).await.unwrap();
        store.insert_lesson(&lesson(2, "Variables")).await.unwrap();
        let first = store.find_lesson_id(1).await.unwrap().unwrap();
        let second = store.find_lesson_id(2).await.unwrap().unwrap();

        let resource = |lesson_id: &RecordId| NewLessonResource {
            lesson_id: lesson_id.clone(),
            title: "The Rust Book".to_string(),
            url: "https://doc.rust-lang.org/book/".to_string(),
            image_url: String::new(),
        };

        assert_eq!(
            store.insert_resource(&resource(&first)).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_resource(&resource(&second)).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_resource(&resource(&first)).await.unwrap(),
            InsertOutcome::Conflict
        );

        assert_eq!(store.count_resources().await.unwrap(), 2);
        assert!(
            store
                .find_resource_id(&first, "The Rust Book")
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(store.list_resources(&second).await.unwrap().len(), 1);
    }
}
