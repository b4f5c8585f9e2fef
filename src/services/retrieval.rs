use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{LessonResource, LessonRow};
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Clone)]
pub struct RetrievedLesson {
    pub row: LessonRow,
    pub resources: Vec<LessonResource>,
    pub score: u32,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedLesson>, StoreError>;
}

/// Ranks stored lessons by keyword overlap with the query.
pub struct KeywordRetriever {
    store: Arc<dyn ContentStore>,
    limit: usize,
}

impl KeywordRetriever {
    pub fn new(store: Arc<dyn ContentStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// Every character of `query` appears in `text`, in order.
fn fuzzy_match(text: &str, query: &str) -> bool {
    let mut wanted = query.chars().filter(|c| !c.is_whitespace()).peekable();
    if wanted.peek().is_none() {
        return false;
    }
    for c in text.chars() {
        if wanted.peek() == Some(&c) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}

pub fn score(row: &LessonRow, query: &str) -> u32 {
    let lesson = &row.lesson;
    let title = lesson.title.to_lowercase();
    let slug = lesson.topic_slug.to_lowercase().replace(['-', '_'], " ");
    let theory = lesson.theory.to_lowercase();
    let normalized = query.trim().to_lowercase();

    let mut score = 0;
    for token in tokenize(&normalized) {
        if title.contains(&token) {
            score += 3;
        }
        if slug.contains(&token) {
            score += 3;
        }
        if theory.contains(&token) {
            score += 1;
        }
    }

    if score == 0 && (fuzzy_match(&title, &normalized) || fuzzy_match(&slug, &normalized)) {
        score = 1;
    }
    score
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedLesson>, StoreError> {
        if self.limit == 0 {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(u32, LessonRow)> = self
            .store
            .list_lessons()
            .await?
            .into_iter()
            .map(|row| (score(&row, query), row))
            .filter(|(score, _)| *score > 0)
            .collect();

        ranked.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then(a.lesson.day_index.cmp(&b.lesson.day_index))
        });
        ranked.truncate(self.limit);

        let mut retrieved = Vec::with_capacity(ranked.len());
        for (score, row) in ranked {
            let resources = self.store.list_resources(&row.id).await?;
            retrieved.push(RetrievedLesson {
                row,
                resources,
                score,
            });
        }

        tracing::debug!("Retrieved {} lessons for query", retrieved.len());
        Ok(retrieved)
    }
}
