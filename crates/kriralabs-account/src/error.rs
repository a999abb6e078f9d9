//! Account-service error types.

use thiserror::Error;

/// Why an api key + bot id pair could not be verified.
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The shared secret is not configured on this gateway.
    #[error("{0}")]
    Misconfigured(String),

    /// The account service could not be reached (connect error, timeout).
    #[error("Unable to verify API key: {0}")]
    UpstreamUnreachable(String),

    /// The account service answered 200 with a body we could not parse.
    #[error("Malformed verification response: {0}")]
    MalformedResponse(String),

    /// The account service refused the pair.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// The caller's usage quota is exhausted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QuotaExceeded {
    pub message: String,
}
