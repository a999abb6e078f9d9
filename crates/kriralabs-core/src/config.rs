//! Gateway configuration, read once at startup and shared read-only.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

/// Top-level gateway configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    /// HTTP server port.
    pub port: u16,
    /// Account-service endpoint that verifies an api key + bot id pair.
    /// The usage-tracking endpoint shares its base path.
    pub verification_url: String,
    /// Shared secret sent as `x-service-key` to the account service.
    pub service_secret: Option<String>,
    /// Base URL of the answering engine.
    pub llm_service_url: String,
    /// Per-call timeout for account-service calls.
    pub upstream_timeout: Duration,
    /// Per-call timeout for the answering engine.
    pub engine_timeout: Duration,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("verification_url", &self.verification_url)
            .field(
                "service_secret",
                &self.service_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("llm_service_url", &self.llm_service_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("engine_timeout", &self.engine_timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Create configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let verification_url = required(&lookup, "API_VERIFICATION_URL")?;
        let llm_service_url = required(&lookup, "LLM_SERVICE_URL")?;

        // An empty secret behaves like an unset one.
        let service_secret = lookup("SERVICE_API_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let upstream_timeout = Duration::from_secs(parse_or(
            &lookup,
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?);
        let engine_timeout = Duration::from_secs(parse_or(
            &lookup,
            "ENGINE_TIMEOUT_SECS",
            DEFAULT_ENGINE_TIMEOUT_SECS,
        )?);

        Ok(Self {
            port,
            verification_url,
            service_secret,
            llm_service_url,
            upstream_timeout,
            engine_timeout,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} is not set", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig> {
        let map = vars(pairs);
        GatewayConfig::from_vars(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("API_VERIFICATION_URL", "http://accounts/api/keys/verify"),
            ("LLM_SERVICE_URL", "http://engine"),
        ])
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.service_secret.is_none());
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.engine_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9100"),
            ("API_VERIFICATION_URL", "http://accounts/api/keys/verify"),
            ("LLM_SERVICE_URL", "http://engine"),
            ("SERVICE_API_SECRET", "s3cret"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.service_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_secret_is_unset() {
        let config = load(&[
            ("API_VERIFICATION_URL", "http://accounts/verify"),
            ("LLM_SERVICE_URL", "http://engine"),
            ("SERVICE_API_SECRET", "   "),
        ])
        .unwrap();
        assert!(config.service_secret.is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("LLM_SERVICE_URL", "http://engine")]).unwrap_err();
        assert!(err.to_string().contains("API_VERIFICATION_URL"));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[
            ("API_VERIFICATION_URL", "http://accounts/verify"),
            ("LLM_SERVICE_URL", "http://engine"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[
            ("API_VERIFICATION_URL", "http://accounts/verify"),
            ("LLM_SERVICE_URL", "http://engine"),
            ("SERVICE_API_SECRET", "hunter2"),
        ])
        .unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
