//! HTTP route handlers.

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the gateway router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/v1", chat::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
