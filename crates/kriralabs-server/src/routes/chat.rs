//! Public chat route consumed by the SDK.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use kriralabs_core::{ChatRequest, ChatResponse};

use crate::error::GatewayError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, GatewayError> {
    let Json(request) = payload.map_err(|e| GatewayError::Validation(e.body_text()))?;

    let response = state
        .orchestrator
        .handle(headers.get(AUTHORIZATION), request)
        .await?;

    Ok(Json(response))
}
