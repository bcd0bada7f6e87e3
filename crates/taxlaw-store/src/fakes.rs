//! In-memory fakes for the retrieval traits (testing only).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Embeddings, RetrievalError, SearchMatch, VectorIndex};

/// Index returning a fixed list of matches, truncated to `k`.
///
/// Records every `(query, k)` it is called with.
#[derive(Debug, Default)]
pub struct StaticIndex {
    matches: Vec<SearchMatch>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl StaticIndex {
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        Self {
            matches,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchMatch>, RetrievalError> {
        self.calls.lock().unwrap().push((query.to_string(), k));
        Ok(self.matches.iter().take(k).cloned().collect())
    }
}

/// Index whose every search fails with [`RetrievalError::Other`].
#[derive(Debug)]
pub struct FailingIndex {
    message: String,
}

impl FailingIndex {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl VectorIndex for FailingIndex {
    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<SearchMatch>, RetrievalError> {
        Err(RetrievalError::Other(self.message.clone()))
    }
}

/// Embeddings returning the same vector for every input.
#[derive(Debug)]
pub struct FixedEmbeddings {
    vector: Vec<f32>,
}

impl FixedEmbeddings {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl Embeddings for FixedEmbeddings {
    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Ok(self.vector.clone())
    }
}
