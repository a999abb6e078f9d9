//! Answering-engine trait and its HTTP implementation.

use std::time::Duration;

use futures::future::BoxFuture;
use kriralabs_core::{ChatResult, GatewayConfig};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::EngineRequest;

const PUBLIC_CHAT_PATH: &str = "public-chat";

#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine refused or failed to answer the question.
    #[error("{0}")]
    Rejected(String),

    #[error("Answering engine unreachable: {0}")]
    Transport(String),

    #[error("Malformed answering engine response: {0}")]
    Malformed(String),
}

/// Anything that can answer a question for a configured bot.
pub trait AnsweringEngine: Send + Sync {
    fn answer(&self, request: EngineRequest) -> BoxFuture<'_, Result<ChatResult, EngineError>>;
}

/// Answering engine reached over HTTP at `{LLM_SERVICE_URL}/public-chat`.
#[derive(Clone)]
pub struct HttpAnsweringEngine {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpAnsweringEngine {
    pub fn new(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            url: format!(
                "{}/{}",
                config.llm_service_url.trim_end_matches('/'),
                PUBLIC_CHAT_PATH
            ),
            timeout: config.engine_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: EngineRequest) -> Result<ChatResult, EngineError> {
        debug!(
            "Asking engine: provider={:?} model={:?} datasets={} top_k={}",
            request.provider,
            request.model_id,
            request.dataset_ids.len(),
            request.top_k
        );

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Answering engine request failed: {}", e);
                EngineError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(EngineError::Rejected(error_detail(&body).unwrap_or_else(
                || format!("Answering engine returned {}", status),
            )));
        }

        serde_json::from_str(&body).map_err(|e| EngineError::Malformed(e.to_string()))
    }
}

impl AnsweringEngine for HttpAnsweringEngine {
    fn answer(&self, request: EngineRequest) -> BoxFuture<'_, Result<ChatResult, EngineError>> {
        Box::pin(self.post(request))
    }
}

/// Error text from an engine error body: `detail` or `message` when JSON,
/// else the raw body.
fn error_detail(body: &str) -> Option<String> {
    let text = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("detail")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)?,
        Err(_) => body.to_string(),
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn engine(base: &str) -> HttpAnsweringEngine {
        let config = GatewayConfig {
            port: 0,
            verification_url: "http://unused/verify".into(),
            service_secret: None,
            llm_service_url: format!("{}/", base),
            upstream_timeout: Duration::from_secs(1),
            engine_timeout: Duration::from_millis(500),
        };
        HttpAnsweringEngine::new(Client::new(), &config)
    }

    fn request() -> EngineRequest {
        EngineRequest {
            provider: Some("openai".into()),
            model_id: Some("gpt-4o-mini".into()),
            system_prompt: None,
            vector_store: Some("pinecone".into()),
            embedding_model: None,
            embedding_dimension: Some(1536),
            dataset_ids: vec!["d1".into()],
            top_k: 30,
            question: "hello".into(),
            vector_store_credentials: None,
        }
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail":"No datasets indexed"}"#).as_deref(),
            Some("No datasets indexed")
        );
        assert_eq!(
            error_detail(r#"{"message":"bad provider"}"#).as_deref(),
            Some("bad provider")
        );
        assert_eq!(error_detail("upstream exploded").as_deref(), Some("upstream exploded"));
        assert_eq!(error_detail(r#"{"other":1}"#), None);
        assert_eq!(error_detail(""), None);
    }

    #[tokio::test]
    async fn test_answer_success() {
        let base = spawn(Router::new().route(
            "/public-chat",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "answer": format!("echo: {}", body["question"].as_str().unwrap_or("")),
                    "context_snippets": ["snippet one"],
                    "tokens_used": 17,
                }))
            }),
        ))
        .await;

        let result = engine(&base).answer(request()).await.unwrap();
        assert_eq!(result.answer, "echo: hello");
        assert_eq!(result.context_snippets, Some(vec!["snippet one".to_string()]));
        assert_eq!(result.tokens_used, Some(17));
    }

    #[tokio::test]
    async fn test_answer_rejected() {
        let base = spawn(Router::new().route(
            "/public-chat",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Unsupported provider"})),
                )
            }),
        ))
        .await;

        match engine(&base).answer(request()).await.unwrap_err() {
            EngineError::Rejected(msg) => assert_eq!(msg, "Unsupported provider"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_answer_malformed() {
        let base = spawn(Router::new().route(
            "/public-chat",
            post(|| async { Json(json!({"text": "no answer field"})) }),
        ))
        .await;

        let err = engine(&base).answer(request()).await.unwrap_err();
        assert!(matches!(err, EngineError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_answer_timeout() {
        let base = spawn(Router::new().route(
            "/public-chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"answer": "late"}))
            }),
        ))
        .await;

        let err = engine(&base).answer(request()).await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
