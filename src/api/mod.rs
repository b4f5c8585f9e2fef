use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Router, extract::State, routing::get};

use crate::error::AppError;
use crate::models::{AgentRequest, AgentResponse, StatusResponse};
use crate::state::AppState;

pub const RUNTIME: &str = "Rust axum";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/agent", post(run_agent))
        .route("/api/agent", post(run_agent))
        .route("/api/status", get(status))
        .with_state(state)
}

async fn run_agent(
    State(state): State<AppState>,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = req.query_text();
    let response = state.agent.handle_query(query.as_deref()).await?;
    Ok(Json(response))
}

/// Liveness only; never touches the store or the model.
async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        runtime: RUNTIME.to_string(),
    })
}
