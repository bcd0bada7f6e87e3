//! Runtime settings from flags and the environment, and service wiring.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use taxlaw_ai::{AnswerOrchestrator, OpenAiChat};
use taxlaw_core::config::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_INDEX_NAME, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE,
    DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_K, OpenAiConfig, PineconeConfig,
};
use taxlaw_store::{ContextRetriever, Embeddings, OpenAiEmbeddings, PineconeIndex, VectorIndex};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// OpenAI API key (embeddings and chat completions).
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Pinecone API key.
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true, global = true)]
    pub pinecone_api_key: Option<String>,

    #[arg(long, env = "PINECONE_INDEX_NAME", default_value = DEFAULT_INDEX_NAME, global = true)]
    pub index_name: String,

    #[arg(long, env = "TAXLAW_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL, global = true)]
    pub embedding_model: String,

    #[arg(long, env = "TAXLAW_LLM_MODEL", default_value = DEFAULT_LLM_MODEL, global = true)]
    pub llm_model: String,

    #[arg(long, env = "TAXLAW_LLM_TEMPERATURE", default_value_t = DEFAULT_LLM_TEMPERATURE, global = true)]
    pub llm_temperature: f32,

    /// Passages retrieved per question.
    #[arg(long, env = "TAXLAW_TOP_K", default_value_t = DEFAULT_TOP_K, global = true)]
    pub top_k: usize,

    /// Timeout for each outbound HTTP request.
    #[arg(long, env = "TAXLAW_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Use a local LanceDB database instead of Pinecone.
    #[cfg(feature = "lancedb")]
    #[arg(long, env = "TAXLAW_LANCE_PATH", global = true)]
    pub lance_path: Option<std::path::PathBuf>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn openai(&self, model: &str) -> anyhow::Result<OpenAiConfig> {
        let api_key = require(&self.openai_api_key, "OPENAI_API_KEY")?;
        Ok(OpenAiConfig {
            model: model.to_string(),
            timeout: self.timeout(),
            ..OpenAiConfig::chat(api_key)
        })
    }

    fn pinecone(&self) -> anyhow::Result<PineconeConfig> {
        let api_key = require(&self.pinecone_api_key, "PINECONE_API_KEY")?;
        Ok(PineconeConfig {
            index_name: self.index_name.clone(),
            timeout: self.timeout(),
            ..PineconeConfig::new(api_key)
        })
    }

    async fn vector_index(
        &self,
        embeddings: Arc<dyn Embeddings>,
    ) -> anyhow::Result<Arc<dyn VectorIndex>> {
        #[cfg(feature = "lancedb")]
        {
            if let Some(path) = &self.lance_path {
                info!(path = %path.display(), "using LanceDB index");
                let index = taxlaw_store::LanceIndex::open(path, embeddings)
                    .await
                    .context("opening LanceDB index")?;
                return Ok(Arc::new(index));
            }
        }

        info!(index = %self.index_name, "using Pinecone index");
        let index = PineconeIndex::connect(self.pinecone()?, embeddings)
            .await
            .context("connecting to Pinecone")?;
        Ok(Arc::new(index))
    }

    /// Open the local LanceDB index with the configured embeddings model.
    #[cfg(feature = "lancedb")]
    pub async fn lance_index(&self) -> anyhow::Result<taxlaw_store::LanceIndex> {
        let path = self
            .lance_path
            .as_deref()
            .context("missing required environment variable TAXLAW_LANCE_PATH")?;
        let embeddings = OpenAiEmbeddings::new(self.openai(&self.embedding_model)?)
            .context("creating embeddings client")?;
        taxlaw_store::LanceIndex::open(path, Arc::new(embeddings))
            .await
            .context("opening LanceDB index")
    }

    /// Build the answer pipeline. Fails when a required key is missing.
    pub async fn build_orchestrator(&self) -> anyhow::Result<AnswerOrchestrator> {
        let embeddings = OpenAiEmbeddings::new(self.openai(&self.embedding_model)?)
            .context("creating embeddings client")?;
        let index = self.vector_index(Arc::new(embeddings)).await?;

        let model = OpenAiChat::new(self.openai(&self.llm_model)?)
            .context("creating chat client")?
            .with_temperature(self.llm_temperature);

        info!(
            llm = %self.llm_model,
            embeddings = %self.embedding_model,
            top_k = self.top_k,
            "answer pipeline ready"
        );
        Ok(AnswerOrchestrator::new(ContextRetriever::new(index), Arc::new(model)).with_top_k(self.top_k))
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> anyhow::Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("missing required environment variable {name}"))
}
