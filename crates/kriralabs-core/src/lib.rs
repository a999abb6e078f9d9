//! Kriralabs Core: request/response model, gateway configuration, errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use types::*;
