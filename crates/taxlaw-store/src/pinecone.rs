//! Pinecone vector index over the REST data plane.
//!
//! Passages are stored with their text under the `text` metadata key and the
//! source reference under `full_reference`. The query text is embedded with
//! the same model used at ingestion time before searching.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taxlaw_core::config::PineconeConfig;
use tracing::{info, warn};

use crate::{Embeddings, RetrievalError, SearchMatch, VectorIndex};

/// Metadata key holding the passage body.
const TEXT_KEY: &str = "text";
const API_VERSION: &str = "2024-07";

/// Similarity search against a named Pinecone index.
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    host: String,
    embeddings: Arc<dyn Embeddings>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

#[derive(Deserialize)]
struct ScoredVector {
    #[serde(default)]
    id: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl PineconeIndex {
    /// Resolve the data-plane host of the configured index and connect.
    pub async fn connect(
        config: PineconeConfig,
        embeddings: Arc<dyn Embeddings>,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let url = format!(
            "{}/indexes/{}",
            config.control_url.trim_end_matches('/'),
            config.index_name
        );

        info!(index = %config.index_name, "resolving Pinecone index host");
        let resp = client
            .get(&url)
            .header("Api-Key", &config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let described: DescribeIndexResponse = resp.json().await?;
        let host = normalize_host(&described.host);
        info!(host = %host, "connected to Pinecone index");

        Ok(Self::with_host(client, config.api_key, host, embeddings))
    }

    /// Use a known data-plane host without calling the control plane.
    pub fn with_host(
        client: reqwest::Client,
        api_key: String,
        host: String,
        embeddings: Arc<dyn Embeddings>,
    ) -> Self {
        Self {
            client,
            api_key,
            host: normalize_host(&host),
            embeddings,
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchMatch>, RetrievalError> {
        let vector = self.embeddings.embed_query(query).await?;
        let body = QueryRequest {
            vector: &vector,
            top_k: k,
            include_metadata: true,
            include_values: false,
        };

        let resp = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = resp.json().await?;
        let matches = into_matches(parsed.matches);
        info!(k, returned = matches.len(), "pinecone similarity search");
        Ok(matches)
    }
}

/// Matches without string `text` metadata have no passage to cite and are dropped.
fn into_matches(scored: Vec<ScoredVector>) -> Vec<SearchMatch> {
    scored
        .into_iter()
        .filter_map(|vector| {
            let mut metadata = vector.metadata;
            match metadata.remove(TEXT_KEY) {
                Some(Value::String(page_content)) => Some(SearchMatch {
                    metadata,
                    page_content,
                }),
                _ => {
                    warn!(id = %vector.id, "found match without '{TEXT_KEY}' metadata, skipping");
                    None
                }
            }
        })
        .collect()
}

/// The control plane returns a bare hostname; the data plane needs a URL.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
