//! Gateway error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kriralabs_account::{QuotaExceeded, VerificationError};
use kriralabs_chat::EngineError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

const ENGINE_UNAVAILABLE: &str = "Answering engine unavailable";

/// Every way a chat request can fail, as seen by the caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Bad caller input; never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Missing or malformed bearer credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// The account service refused the api key + bot id pair.
    #[error("{message}")]
    VerificationRejected { status: u16, message: String },

    /// The account service could not be reached.
    #[error("{0}")]
    UpstreamUnreachable(String),

    /// The account service answered with something unusable.
    #[error("{0}")]
    UpstreamMalformed(String),

    #[error("Bot is not configured with an LLM")]
    BotNotConfigured,

    /// The answering engine could not answer the question.
    #[error("{0}")]
    Answering(String),

    #[error("{0}")]
    QuotaExceeded(String),

    /// Server-side setup fault.
    #[error("{0}")]
    Misconfigured(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::VerificationRejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::UpstreamUnreachable(_) | Self::UpstreamMalformed(_) => StatusCode::BAD_GATEWAY,
            Self::BotNotConfigured | Self::Answering(_) => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::VerificationRejected { .. } => "VERIFICATION_REJECTED",
            Self::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            Self::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
            Self::BotNotConfigured => "BOT_NOT_CONFIGURED",
            Self::Answering(_) => "ANSWERING_ERROR",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::Misconfigured(_) => "MISCONFIGURED",
        }
    }
}

impl From<kriralabs_core::Error> for GatewayError {
    fn from(e: kriralabs_core::Error) -> Self {
        match e {
            kriralabs_core::Error::Validation(msg) => GatewayError::Validation(msg),
            kriralabs_core::Error::Config(msg) => GatewayError::Misconfigured(msg),
        }
    }
}

impl From<VerificationError> for GatewayError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::Misconfigured(msg) => GatewayError::Misconfigured(msg),
            // Transport detail is logged by the verifier, not echoed to callers.
            VerificationError::UpstreamUnreachable(_) => {
                GatewayError::UpstreamUnreachable("Unable to verify API key".into())
            }
            VerificationError::MalformedResponse(_) => {
                GatewayError::UpstreamMalformed("Unable to verify API key".into())
            }
            VerificationError::Rejected { status, message } => {
                GatewayError::VerificationRejected { status, message }
            }
        }
    }
}

impl From<EngineError> for GatewayError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Rejected(msg) => GatewayError::Answering(msg),
            // Transport and parse detail name the engine's address.
            EngineError::Transport(_) | EngineError::Malformed(_) => {
                warn!("Answering engine failed: {}", e);
                GatewayError::Answering(ENGINE_UNAVAILABLE.into())
            }
        }
    }
}

impl From<QuotaExceeded> for GatewayError {
    fn from(e: QuotaExceeded) -> Self {
        GatewayError::QuotaExceeded(e.message)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} ({}): {}", status, self.code(), self);
        }

        let body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
