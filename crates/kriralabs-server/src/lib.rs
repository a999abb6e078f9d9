//! Kriralabs gateway: lets third parties query a configured chatbot without
//! holding LLM or vector-store credentials.

pub mod auth;
pub mod error;
pub mod orchestrator;
pub mod routes;
pub mod state;

pub use error::GatewayError;
pub use orchestrator::{ChatOrchestrator, Stage};
pub use state::AppState;
