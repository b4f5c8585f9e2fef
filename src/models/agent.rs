use serde::{Deserialize, Serialize};

/// Body of `POST /agent`. Fields other than `query` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub query: Option<serde_json::Value>,
}

impl AgentRequest {
    /// The query as text; non-string JSON values are rendered as JSON.
    pub fn query_text(&self) -> Option<String> {
        match &self.query {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// `status` of an agent body. The handler only ever answers `success`;
/// failures travel as an `AppError` body with a non-2xx code, and `error`
/// exists for clients reading the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub status: AgentStatus,
    pub agent_response: String,
    pub tokens_used: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub runtime: String,
}
