//! Model-generation collaborator.
//!
//! `ModelClient` is the seam the agent talks to; `groq` is the hosted
//! implementation and `EchoModel` stands in when no API key is configured.

pub mod groq;

use async_trait::async_trait;
use serde::Serialize;

/// Errors from model generation.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub temperature: f32,
    pub system: Option<String>,
    pub prompt: String,
}

/// Token counts plus the provider's timing breakdown, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub prompt_time: Option<f64>,
    pub completion_time: Option<f64>,
    pub total_time: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub content: String,
    pub usage: Usage,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;
}

/// Answers without calling a model: restates the user prompt.
pub struct EchoModel;

#[async_trait]
impl ModelClient for EchoModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        Ok(Generation {
            content: format!("Processing query: '{}'.", request.prompt),
            usage: Usage::default(),
        })
    }
}
