//! Typed SDK errors, one variant per failure kind.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    /// Invalid input, rejected before any request is sent.
    #[error("{0}")]
    Validation(String),

    /// The API could not be reached (connect error, timeout).
    #[error("{0}")]
    Transport(String),

    /// 401: the API key is invalid or revoked.
    #[error("{0}")]
    Authentication(String),

    /// 403: the API key may not use this bot.
    #[error("{0}")]
    PermissionDenied(String),

    /// 429.
    #[error("{0}")]
    RateLimit(String),

    /// Any other 4xx, with the server's message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 5xx, or a success response without a usable payload.
    #[error("{0}")]
    Server(String),
}

impl SdkError {
    /// HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication(_) => Some(401),
            Self::PermissionDenied(_) => Some(403),
            Self::RateLimit(_) => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
