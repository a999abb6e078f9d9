//! Shared application state.

use std::sync::Arc;

use kriralabs_chat::AnsweringEngine;
use kriralabs_core::GatewayConfig;

use crate::orchestrator::ChatOrchestrator;

/// State shared by all route handlers. Read-only after startup.
pub struct AppState {
    pub orchestrator: ChatOrchestrator,
}

impl AppState {
    /// The orchestrator takes what it needs from `config`; nothing else
    /// reads it after startup.
    pub fn new(
        config: GatewayConfig,
        client: reqwest::Client,
        engine: Arc<dyn AnsweringEngine>,
    ) -> Self {
        Self {
            orchestrator: ChatOrchestrator::from_config(client, &config, engine),
        }
    }
}
