pub mod dto;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ConfigError;
use crate::models::{Lesson, LessonResource, LessonRow, NewLessonResource};
use crate::store::{ContentStore, InsertOutcome, RecordId, StoreError};

pub const LESSONS_TABLE: &str = "lessons";
pub const RESOURCES_TABLE: &str = "lesson_resources";

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new_from_env(timeout: Duration) -> Result<Self, ConfigError> {
        let url = Self::url_from_env().ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let service_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        Ok(Self {
            url,
            service_key,
            timeout,
        })
    }

    /// The web client's `VITE_SUPABASE_URL` is accepted as well.
    pub fn url_from_env() -> Option<String> {
        env::var("SUPABASE_URL")
            .or_else(|_| env::var("VITE_SUPABASE_URL"))
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// `ContentStore` over Supabase's PostgREST endpoint (`/rest/v1/<table>`).
pub struct SupabaseHttpStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseHttpStore {
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, StoreError> {
        let base = format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table);
        let mut url = Url::parse(&base)
            .map_err(|e| StoreError::Config(format!("invalid Supabase URL '{}': {}", base, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .header("Authorization", format!("Bearer {}", self.config.service_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorized(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let parsed: dto::ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(StoreError::Api {
                status,
                message: parsed.summary(&body),
            });
        }

        Ok(response)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table, params)?;
        let response = self.send(self.client.get(url)).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse {} rows: {}", table, e);
            StoreError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e))
        })
    }

    /// Inserts one row, letting the table's unique constraint on
    /// `on_conflict` absorb duplicates. PostgREST returns an empty array when
    /// the row was ignored.
    async fn insert_ignoring_duplicates<B: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<InsertOutcome, StoreError> {
        let url = self.table_url(
            table,
            &[("on_conflict", on_conflict.to_string()), ("select", "id".to_string())],
        )?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation,resolution=ignore-duplicates")
            .json(body);
        let response = self.send(request).await?;
        let body = response.text().await?;
        let rows: Vec<dto::IdRow> = serde_json::from_str(&body).map_err(|e| {
            StoreError::InvalidResponse(format!("Failed to parse {} insert: {}", table, e))
        })?;

        if rows.is_empty() {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ContentStore for SupabaseHttpStore {
    async fn find_lesson_id(&self, day_index: u32) -> Result<Option<RecordId>, StoreError> {
        let rows: Vec<dto::IdRow> = self
            .select(
                LESSONS_TABLE,
                &[("select", "id".to_string()), ("day_index", eq(day_index))],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<InsertOutcome, StoreError> {
        self.insert_ignoring_duplicates(LESSONS_TABLE, "day_index", lesson)
            .await
    }

    async fn find_resource_id(
        &self,
        lesson_id: &RecordId,
        title: &str,
    ) -> Result<Option<RecordId>, StoreError> {
        let rows: Vec<dto::IdRow> = self
            .select(
                RESOURCES_TABLE,
                &[
                    ("select", "id".to_string()),
                    ("lesson_id", eq(lesson_id)),
                    ("title", eq(title)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn insert_resource(
        &self,
        resource: &NewLessonResource,
    ) -> Result<InsertOutcome, StoreError> {
        self.insert_ignoring_duplicates(RESOURCES_TABLE, "lesson_id,title", resource)
            .await
    }

    async fn list_lessons(&self) -> Result<Vec<LessonRow>, StoreError> {
        self.select(
            LESSONS_TABLE,
            &[("select", "*".to_string()), ("order", "day_index.asc".to_string())],
        )
        .await
    }

    async fn list_resources(
        &self,
        lesson_id: &RecordId,
    ) -> Result<Vec<LessonResource>, StoreError> {
        self.select(
            RESOURCES_TABLE,
            &[
                ("select", "id,lesson_id,title,url,image_url".to_string()),
                ("lesson_id", eq(lesson_id)),
                ("order", "title.asc".to_string()),
            ],
        )
        .await
    }
}
