//! Public chat types: inbound request, bot configuration, engine result,
//! outbound response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const MIN_BOT_ID_LEN: usize = 4;
pub const MAX_CONVERSATION_ID_LEN: usize = 64;
pub const DEFAULT_TOP_K: u32 = 30;

/// Incoming chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub bot_id: String,
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl ChatRequest {
    /// Check field constraints before the request touches the network.
    pub fn validate(&self) -> Result<()> {
        if self.bot_id.chars().count() < MIN_BOT_ID_LEN {
            return Err(Error::Validation(format!(
                "bot_id must be at least {} characters",
                MIN_BOT_ID_LEN
            )));
        }
        if self.query.is_empty() {
            return Err(Error::Validation("query must not be empty".into()));
        }
        if let Some(id) = &self.conversation_id {
            if id.chars().count() > MAX_CONVERSATION_ID_LEN {
                return Err(Error::Validation(format!(
                    "conversation_id must be at most {} characters",
                    MAX_CONVERSATION_ID_LEN
                )));
            }
        }
        Ok(())
    }
}

/// Bot configuration returned by the account service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfiguration {
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,
}

impl BotConfiguration {
    /// The LLM section, if the bot has one with any populated field.
    pub fn llm(&self) -> Option<&LlmConfig> {
        self.llm.as_ref().filter(|llm| !llm.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub top_k: Option<u32>,
    /// Provider-specific settings the gateway passes over.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LlmConfig {
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.system_prompt.is_none()
            && self.top_k.is_none()
            && self.extra.is_empty()
    }

    pub fn top_k(&self) -> u32 {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub vector_store: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub dataset_ids: Option<Vec<String>>,
    /// Vector-store credentials and index settings.
    #[serde(default, rename = "pineconeConfig")]
    pub vector_store_config: Option<Value>,
}

/// Answer produced by the answering engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResult {
    pub answer: String,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub context_snippets: Option<Vec<String>>,
    #[serde(default)]
    pub tokens_used: Option<u64>,
}

/// Outbound chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub bot_id: String,
    pub answer: String,
    pub latency_ms: u64,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub context_snippets: Option<Vec<String>>,
}
