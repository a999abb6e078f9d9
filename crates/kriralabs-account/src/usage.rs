//! Best-effort usage tracking.
//!
//! Tracking never fails a chat request, with one exception: a 402 from the
//! account service means the caller's quota is exhausted, and that is
//! surfaced as [`QuotaExceeded`].

use std::time::Duration;

use kriralabs_core::GatewayConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::QuotaExceeded;
use crate::SERVICE_KEY_HEADER;

const TRACKING_SEGMENT: &str = "track-usage";
const DEFAULT_QUOTA_MESSAGE: &str = "Request limit reached";

/// Derive the tracking endpoint from the verification endpoint: both live
/// under the same base path.
pub fn tracking_url(verification_url: &str) -> String {
    let trimmed = verification_url.trim_end_matches('/');
    let base = match trimmed.rsplit_once('/') {
        Some((base, _)) => base,
        None => trimmed,
    };
    format!("{}/{}", base, TRACKING_SEGMENT)
}

/// Outcome of a tracking call that did not exhaust the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageAck {
    /// The account service recorded the usage.
    Recorded,
    /// Tracking is not configured on this gateway.
    Disabled,
    /// The call failed and the usage was not recorded.
    Dropped,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackPayload<'a> {
    api_key: &'a str,
    bot_id: &'a str,
    tokens: u64,
}

#[derive(Deserialize)]
struct QuotaBody {
    message: Option<String>,
}

/// Client for the account service's usage-tracking endpoint.
#[derive(Clone)]
pub struct UsageTracker {
    client: Client,
    url: String,
    secret: Option<String>,
    timeout: Duration,
}

impl UsageTracker {
    pub fn new(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            url: tracking_url(&config.verification_url),
            secret: config.service_secret.clone(),
            timeout: config.upstream_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Report `tokens` consumed by `api_key` against `bot_id`.
    pub async fn track(
        &self,
        api_key: &str,
        bot_id: &str,
        tokens: u64,
    ) -> Result<UsageAck, QuotaExceeded> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(UsageAck::Disabled);
        };

        let response = match self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(SERVICE_KEY_HEADER, secret)
            .json(&TrackPayload {
                api_key,
                bot_id,
                tokens,
            })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Usage tracking for bot {} failed: {}", bot_id, e);
                return Ok(UsageAck::Dropped);
            }
        };

        let status = response.status();
        if status == StatusCode::PAYMENT_REQUIRED {
            let message = response
                .json::<QuotaBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_QUOTA_MESSAGE.into());
            debug!("Quota exhausted for bot {}: {}", bot_id, message);
            return Err(QuotaExceeded { message });
        }

        if !status.is_success() {
            warn!("Usage tracking for bot {} returned {}", bot_id, status);
            return Ok(UsageAck::Dropped);
        }

        debug!("Recorded {} tokens for bot {}", tokens, bot_id);
        Ok(UsageAck::Recorded)
    }
}
