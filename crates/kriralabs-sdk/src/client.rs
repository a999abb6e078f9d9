//! HTTP client for the Kriralabs public chat API.

use std::fmt;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SdkError;

pub const DEFAULT_BASE_URL: &str = "https://rag-python-backend.onrender.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = concat!("kriralabs-sdk/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`Kriralabs`].
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub bot_id: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("bot_id", &self.bot_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, bot_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bot_id: bot_id.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Per-call options for [`Kriralabs::ask`].
///
/// `conversation_id` and `metadata` are sent only when non-empty; `timeout`
/// overrides the client default for this call.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    conversation_id: Option<String>,
    metadata: Option<Map<String, Value>>,
    timeout: Option<Duration>,
}

impl AskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Normalized response returned by [`Kriralabs::ask`].
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub answer: String,
    pub bot_id: String,
    pub conversation_id: Option<String>,
    pub context_snippets: Option<Vec<String>>,
    pub latency_ms: Option<u64>,
    /// The full response payload.
    pub raw: Value,
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    bot_id: &'a str,
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Map<String, Value>>,
}

/// Thin client for the public chat API.
///
/// Holds a pooled HTTP connection. Call [`Kriralabs::close`] to release it
/// explicitly, or let the client drop.
pub struct Kriralabs {
    api_key: String,
    bot_id: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl fmt::Debug for Kriralabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kriralabs")
            .field("api_key", &"<redacted>")
            .field("bot_id", &self.bot_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

pub type KriraChatbot = Kriralabs;
pub type KriralabsClient = Kriralabs;

impl Kriralabs {
    pub fn new(config: ClientConfig) -> Result<Self, SdkError> {
        Self::with_http_client(config, Client::new())
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http: Client) -> Result<Self, SdkError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(SdkError::Validation("api_key is required".into()));
        }
        let bot_id = config.bot_id.trim();
        if bot_id.is_empty() {
            return Err(SdkError::Validation("bot_id is required".into()));
        }
        if config.timeout.is_zero() {
            return Err(SdkError::Validation(
                "timeout must be greater than zero".into(),
            ));
        }

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key: api_key.to_string(),
            bot_id: bot_id.to_string(),
            base_url,
            timeout: config.timeout,
            http,
        })
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a question to the chatbot and return its answer.
    pub async fn ask(&self, question: &str, options: AskOptions) -> Result<ChatResponse, SdkError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SdkError::Validation(
                "question must be a non-empty string".into(),
            ));
        }
        let timeout = options.timeout.unwrap_or(self.timeout);
        if timeout.is_zero() {
            return Err(SdkError::Validation(
                "timeout must be greater than zero".into(),
            ));
        }

        let payload = ChatPayload {
            bot_id: &self.bot_id,
            query: question,
            conversation_id: options.conversation_id.as_deref().filter(|id| !id.is_empty()),
            metadata: options.metadata.as_ref().filter(|m| !m.is_empty()),
        };

        let response = self.post("/chat", &payload, timeout).await?;
        let data = parse_response(response).await?;

        let answer = match data.get("answer").and_then(Value::as_str) {
            Some(answer) if !answer.is_empty() => answer.to_string(),
            _ => {
                return Err(SdkError::Server(
                    "Chat response payload is missing the 'answer' field".into(),
                ))
            }
        };

        Ok(ChatResponse {
            answer,
            bot_id: data
                .get("bot_id")
                .and_then(Value::as_str)
                .unwrap_or(&self.bot_id)
                .to_string(),
            conversation_id: data
                .get("conversation_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            context_snippets: data
                .get("context_snippets")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            latency_ms: data.get("latency_ms").and_then(Value::as_u64),
            raw: data,
        })
    }

    /// Release the underlying connection pool.
    pub fn close(self) {
        debug!("Closing Kriralabs client for bot {}", self.bot_id);
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        timeout: Duration,
    ) -> Result<Response, SdkError> {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .post(&url)
            .timeout(timeout)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT_HEADER, USER_AGENT)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                debug!("Request to {} failed: {}", url, e);
                if e.is_timeout() {
                    SdkError::Transport("Request to Kriralabs timed out".into())
                } else {
                    SdkError::Transport("Unable to reach Kriralabs API".into())
                }
            })
    }
}

async fn parse_response(response: Response) -> Result<Value, SdkError> {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => Err(SdkError::Authentication(
            "API key is invalid or has been revoked".into(),
        )),
        StatusCode::FORBIDDEN => Err(SdkError::PermissionDenied(
            "API key lacks permission to access this bot".into(),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(SdkError::RateLimit(
            "API rate limit exceeded. Slow down your requests.".into(),
        )),
        s if s.is_client_error() => {
            let body = response.text().await.unwrap_or_default();
            Err(SdkError::Api {
                status: s.as_u16(),
                message: extract_error_message(&body)
                    .unwrap_or_else(|| "Invalid request".into()),
            })
        }
        s if s.is_server_error() => Err(SdkError::Server(
            "Kriralabs service is temporarily unavailable".into(),
        )),
        _ => response
            .json::<Value>()
            .await
            .map_err(|_| SdkError::Server("Received a non-JSON response from Kriralabs".into())),
    }
}

/// Message from an error body: JSON `message` or `detail`, else raw text.
fn extract_error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("detail"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
        Ok(Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => body.trim().to_string(),
    };
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_credentials() {
        let err = Kriralabs::new(ClientConfig::new("  ", "employee3")).unwrap_err();
        assert!(matches!(err, SdkError::Validation(ref m) if m == "api_key is required"));

        let err = Kriralabs::new(ClientConfig::new("kl_live_123", "")).unwrap_err();
        assert!(matches!(err, SdkError::Validation(ref m) if m == "bot_id is required"));

        let err = Kriralabs::new(
            ClientConfig::new("kl_live_123", "employee3").timeout(Duration::ZERO),
        )
        .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[test]
    fn test_new_trims_and_defaults() {
        let client = Kriralabs::new(ClientConfig::new(" kl_live_123 ", " employee3 ")).unwrap();
        assert_eq!(client.bot_id(), "employee3");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = Kriralabs::new(
            ClientConfig::new("k", "employee3").base_url("http://localhost:8000/v1/"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/v1");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("kl_live_secret", "employee3");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("kl_live_secret"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("employee3"));

        let client = Kriralabs::new(config).unwrap();
        let printed = format!("{:?}", client);
        assert!(!printed.contains("kl_live_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_blank_question_fails_locally() {
        // Nothing listens here; a network call would surface as Transport.
        let client = Kriralabs::new(
            ClientConfig::new("k", "employee3").base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let err = client.ask("   ", AskOptions::new()).await.unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));

        let err = client
            .ask("hello", AskOptions::new().timeout(Duration::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[test]
    fn test_payload_omits_empty_options() {
        let metadata = Map::new();
        let payload = ChatPayload {
            bot_id: "employee3",
            query: "hello",
            conversation_id: None,
            metadata: Some(&metadata).filter(|m| !m.is_empty()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({"bot_id": "employee3", "query": "hello"}));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"message":"Monthly limit reached"}"#).as_deref(),
            Some("Monthly limit reached")
        );
        assert_eq!(
            extract_error_message(r#"{"detail":"Bot is not configured with an LLM"}"#).as_deref(),
            Some("Bot is not configured with an LLM")
        );
        assert_eq!(extract_error_message(" plain text ").as_deref(), Some("plain text"));
        assert_eq!(extract_error_message(r#"{"other":true}"#), None);
        assert_eq!(extract_error_message(""), None);
    }
}
