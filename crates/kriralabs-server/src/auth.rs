//! Bearer credential extraction.

use axum::http::HeaderValue;

use crate::error::GatewayError;

/// Pull the bearer token out of an `Authorization` header value.
pub fn extract_bearer_token(authorization: Option<&HeaderValue>) -> Result<String, GatewayError> {
    let Some(value) = authorization else {
        return Err(GatewayError::Unauthenticated(
            "Missing Authorization header".into(),
        ));
    };

    let invalid = || GatewayError::Unauthenticated("Invalid Authorization header".into());

    let raw = value.to_str().map_err(|_| invalid())?;
    if raw.is_empty() {
        return Err(GatewayError::Unauthenticated(
            "Missing Authorization header".into(),
        ));
    }

    let (scheme, token) = raw.split_once(' ').unwrap_or((raw, ""));
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(invalid());
    }

    Ok(token.to_string())
}
