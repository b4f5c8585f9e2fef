use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::llm::LlmError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] StoreError),

    #[error("Model generation failed: {0}")]
    Model(#[from] LlmError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error body: a stable `error` kind plus a human-readable `detail`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub detail: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Retrieval(_) => "retrieval_failed",
            AppError::Model(LlmError::RateLimited { .. }) => "model_rate_limited",
            AppError::Model(LlmError::MissingApiKey(_)) => "model_unavailable",
            AppError::Model(_) => "model_failed",
            AppError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, detail) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Retrieval(e) => {
                error!("retrieval error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Lesson retrieval failed".to_string(),
                )
            }
            AppError::Model(LlmError::RateLimited { retry_after }) => {
                error!("model rate limited (retry after {:?}s)", retry_after);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The language model is rate limited, try again shortly".to_string(),
                )
            }
            AppError::Model(e) => {
                error!("model error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Language model request failed".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: kind,
            detail,
        });

        (status, body).into_response()
    }
}
