//! Capability traits for the external embedding model and vector index.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::RetrievalError;

/// Metadata key holding the human-readable source reference of a passage.
pub const FULL_REFERENCE_KEY: &str = "full_reference";

/// One passage returned by a similarity search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMatch {
    pub metadata: Map<String, Value>,
    pub page_content: String,
}

impl SearchMatch {
    /// Build a match carrying only a `full_reference` entry.
    pub fn new(full_reference: &str, page_content: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(
            FULL_REFERENCE_KEY.to_string(),
            Value::String(full_reference.to_string()),
        );
        Self {
            metadata,
            page_content: page_content.into(),
        }
    }

    /// The `full_reference` metadata value, if present and a string.
    pub fn full_reference(&self) -> Option<&str> {
        self.metadata.get(FULL_REFERENCE_KEY).and_then(Value::as_str)
    }
}

/// Embeds query text into the vector space of the index.
#[async_trait]
pub trait Embeddings: Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Nearest-neighbour search over legislation passages.
///
/// Implementations return at most `k` matches, closest first. Tie-breaking is
/// left to the backend.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchMatch>, RetrievalError>;
}
