//! Clients for the account service: entitlement verification and usage
//! tracking. Both calls authenticate with the shared `x-service-key` secret.

pub mod error;
pub mod usage;
pub mod verify;

#[cfg(test)]
mod mock;

pub use error::{QuotaExceeded, VerificationError};
pub use usage::{tracking_url, UsageAck, UsageTracker};
pub use verify::Verifier;

/// Header carrying the service-to-service shared secret.
pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// Pull a human-readable message out of an error response body.
///
/// JSON bodies contribute their `message` field; anything else is used as raw
/// text.
pub(crate) fn response_message(is_json: bool, body: &str) -> Option<String> {
    let message = if is_json {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            Err(_) => Some(body.to_string()),
        }
    } else {
        Some(body.to_string())
    };

    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

pub(crate) fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_message_json() {
        let msg = response_message(true, r#"{"message":"Invalid API key"}"#);
        assert_eq!(msg.as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn test_response_message_json_without_field() {
        assert_eq!(response_message(true, r#"{"error":"nope"}"#), None);
    }

    #[test]
    fn test_response_message_text() {
        let msg = response_message(false, "  Bad Gateway \n");
        assert_eq!(msg.as_deref(), Some("Bad Gateway"));
        assert_eq!(response_message(false, ""), None);
    }
}
