//! Chat orchestrator: the request pipeline behind `POST /v1/chat`.
//!
//! ```text
//! Start → Authenticated → Verified → Answered → Tracked → Responded
//! ```
//!
//! Any stage may fail; the failure carries a [`GatewayError`] and the log line
//! records the last stage that completed. Verification and tracking run
//! sequentially: tracking needs the answer's token usage.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderValue;
use kriralabs_account::{UsageTracker, Verifier};
use kriralabs_chat::{AnsweringEngine, EngineRequest};
use kriralabs_core::{ChatRequest, ChatResponse, GatewayConfig};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::extract_bearer_token;
use crate::error::GatewayError;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Authenticated,
    Verified,
    Answered,
    Tracked,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Verified => write!(f, "verified"),
            Self::Answered => write!(f, "answered"),
            Self::Tracked => write!(f, "tracked"),
            Self::Responded => write!(f, "responded"),
        }
    }
}

pub struct ChatOrchestrator {
    verifier: Verifier,
    tracker: UsageTracker,
    engine: Arc<dyn AnsweringEngine>,
}

impl ChatOrchestrator {
    pub fn new(verifier: Verifier, tracker: UsageTracker, engine: Arc<dyn AnsweringEngine>) -> Self {
        Self {
            verifier,
            tracker,
            engine,
        }
    }

    /// Build the account-service clients from `config`, sharing `client`'s
    /// connection pool.
    pub fn from_config(
        client: reqwest::Client,
        config: &GatewayConfig,
        engine: Arc<dyn AnsweringEngine>,
    ) -> Self {
        let verifier = Verifier::new(client.clone(), config);
        let tracker = UsageTracker::new(client, config);
        info!(
            "Orchestrator initialized: verify={}, track={}",
            verifier.url(),
            tracker.url()
        );
        Self::new(verifier, tracker, engine)
    }

    /// Run one chat request through the full pipeline.
    pub async fn handle(
        &self,
        authorization: Option<&HeaderValue>,
        request: ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        let request_id = Uuid::new_v4();
        let mut stage = Stage::Start;

        let result = self.run(authorization, &request, &mut stage).await;

        match &result {
            Ok(response) => info!(
                "[{}] chat bot={} latency_ms={} {}",
                request_id, request.bot_id, response.latency_ms, stage
            ),
            Err(e) => warn!(
                "[{}] chat bot={} failed after {}: {} {}",
                request_id,
                request.bot_id,
                stage,
                e.code(),
                e
            ),
        }

        result
    }

    async fn run(
        &self,
        authorization: Option<&HeaderValue>,
        request: &ChatRequest,
        stage: &mut Stage,
    ) -> Result<ChatResponse, GatewayError> {
        request.validate()?;

        let api_key = extract_bearer_token(authorization)?;
        *stage = Stage::Authenticated;

        let bot = self.verifier.verify(&api_key, &request.bot_id).await?;
        let llm = bot.llm().ok_or(GatewayError::BotNotConfigured)?;
        *stage = Stage::Verified;

        let engine_request = EngineRequest::from_bot(llm, &bot, &request.query);
        let start = Instant::now();
        let result = self.engine.answer(engine_request).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if result.answer.trim().is_empty() {
            return Err(GatewayError::Answering(
                "Answering engine returned an empty answer".into(),
            ));
        }
        *stage = Stage::Answered;
        debug!("Answered bot {} in {}ms", request.bot_id, latency_ms);

        // The answer is already computed here; a 402 still rejects it.
        let ack = self
            .tracker
            .track(&api_key, &request.bot_id, result.tokens_used.unwrap_or(0))
            .await?;
        *stage = Stage::Tracked;
        debug!("Usage for bot {}: {:?}", request.bot_id, ack);

        let response = ChatResponse {
            bot_id: request.bot_id.clone(),
            answer: result.answer,
            latency_ms,
            conversation_id: request.conversation_id.clone(),
            context_snippets: result.context_snippets,
        };
        *stage = Stage::Responded;

        Ok(response)
    }
}
