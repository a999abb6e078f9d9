//! Answering engine: the retrieval-augmented service that turns a bot
//! configuration and a question into an answer.
//!
//! The gateway only depends on the [`AnsweringEngine`] trait; the HTTP client
//! in [`engine`] is the production implementation.

pub mod engine;
pub mod types;

pub use engine::{AnsweringEngine, EngineError, HttpAnsweringEngine};
pub use types::EngineRequest;
