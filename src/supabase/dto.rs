use serde::Deserialize;

use crate::store::RecordId;

/// `select=id` projection.
#[derive(Debug, Deserialize)]
pub struct IdRow {
    pub id: RecordId,
}

/// PostgREST error body. Every field is optional depending on where the
/// request failed (gateway, PostgREST, or Postgres).
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    pub fn summary(&self, raw: &str) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{} ({})", message, code),
            (None, Some(message)) => message.clone(),
            _ => raw.to_string(),
        }
    }
}
