//! Entitlement verification: api key + bot id → bot configuration.

use std::time::Duration;

use kriralabs_core::{BotConfiguration, GatewayConfig};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::VerificationError;
use crate::{is_json, response_message, SERVICE_KEY_HEADER};

const DEFAULT_REJECTION: &str = "API key verification failed";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyPayload<'a> {
    api_key: &'a str,
    bot_id: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    bot: Option<BotConfiguration>,
}

/// Client for the account service's verification endpoint.
#[derive(Clone)]
pub struct Verifier {
    client: Client,
    url: String,
    secret: Option<String>,
    timeout: Duration,
}

impl Verifier {
    pub fn new(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            url: config.verification_url.trim_end_matches('/').to_string(),
            secret: config.service_secret.clone(),
            timeout: config.upstream_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the account service whether `api_key` may use `bot_id`.
    ///
    /// Issues exactly one request; there is no retry.
    pub async fn verify(
        &self,
        api_key: &str,
        bot_id: &str,
    ) -> Result<BotConfiguration, VerificationError> {
        let secret = self.secret.as_deref().ok_or_else(|| {
            VerificationError::Misconfigured("SERVICE_API_SECRET is not configured".into())
        })?;

        debug!("Verifying API key for bot {}", bot_id);

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(SERVICE_KEY_HEADER, secret)
            .json(&VerifyPayload { api_key, bot_id })
            .send()
            .await
            .map_err(|e| {
                warn!("Verification request to {} failed: {}", self.url, e);
                VerificationError::UpstreamUnreachable(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            let body = response
                .bytes()
                .await
                .map_err(|e| VerificationError::UpstreamUnreachable(e.to_string()))?;
            let parsed: VerifyResponse = serde_json::from_slice(&body)
                .map_err(|e| VerificationError::MalformedResponse(e.to_string()))?;
            return Ok(parsed.bot.unwrap_or_default());
        }

        let json = is_json(&response);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Failed to read verification rejection body ({}) for bot {}: {}",
                    status, bot_id, e
                );
                String::new()
            }
        };
        let message = response_message(json, &body).unwrap_or_else(|| DEFAULT_REJECTION.into());

        debug!("Verification rejected for bot {}: {} {}", bot_id, status, message);

        Err(VerificationError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
