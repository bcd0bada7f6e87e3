//! Shared configuration defaults for the external model and index services.

use std::time::Duration;

pub const DEFAULT_INDEX_NAME: &str = "taxlawlegato";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.0;
/// Number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8000;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";

/// Connection settings for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Settings for the chat-completions model.
    pub fn chat(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Settings for the embeddings model.
    pub fn embeddings(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            ..Self::chat(api_key)
        }
    }
}

/// Connection settings for a Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_name: String,
    pub control_url: String,
    pub timeout: Duration,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            control_url: PINECONE_CONTROL_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
