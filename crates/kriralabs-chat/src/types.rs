//! Engine request parameters.

use kriralabs_core::{BotConfiguration, LlmConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the answering engine needs to answer one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub provider: Option<String>,
    pub model_id: Option<String>,
    pub system_prompt: Option<String>,
    pub vector_store: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dimension: Option<u32>,
    pub dataset_ids: Vec<String>,
    pub top_k: u32,
    pub question: String,
    /// Vector-store credentials, passed through untouched.
    #[serde(rename = "pinecone")]
    pub vector_store_credentials: Option<Value>,
}

impl EngineRequest {
    /// Map a verified bot's LLM and embedding settings onto engine parameters.
    pub fn from_bot(llm: &LlmConfig, bot: &BotConfiguration, question: &str) -> Self {
        let embedding = bot.embedding.clone().unwrap_or_default();
        Self {
            provider: llm.provider.clone(),
            model_id: llm.model.clone(),
            system_prompt: llm.system_prompt.clone(),
            vector_store: embedding.vector_store,
            embedding_model: embedding.model,
            embedding_dimension: embedding.dimension,
            dataset_ids: embedding.dataset_ids.unwrap_or_default(),
            top_k: llm.top_k(),
            question: question.to_string(),
            vector_store_credentials: embedding.vector_store_config,
        }
    }
}
