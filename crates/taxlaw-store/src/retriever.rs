//! Context retrieval: similarity search rendered as a prompt-ready text block.

use std::sync::Arc;

use tracing::info;

use crate::{RetrievalError, SearchMatch, VectorIndex};

/// Fetches the passages closest to a question and renders them as context.
#[derive(Clone)]
pub struct ContextRetriever {
    index: Arc<dyn VectorIndex>,
}

impl ContextRetriever {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    /// Search the index for `query` and render up to `k` matches.
    ///
    /// Zero matches renders as an empty string. Search failures propagate.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> Result<String, RetrievalError> {
        let matches = self.index.similarity_search(query, k).await?;
        info!(k, matches = matches.len(), "retrieved context");
        render_context(&matches)
    }
}

/// Render matches in order, one `Section: <reference>` block each.
///
/// Blocks are separated by a blank line.
pub fn render_context(matches: &[SearchMatch]) -> Result<String, RetrievalError> {
    let mut blocks = Vec::with_capacity(matches.len());
    for (position, m) in matches.iter().enumerate() {
        let reference = m
            .full_reference()
            .ok_or(RetrievalError::MissingReference { position })?;
        blocks.push(format!("Section: {reference}\n{}", m.page_content));
    }
    Ok(blocks.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FailingIndex, StaticIndex};

    fn matches() -> Vec<SearchMatch> {
        vec![
            SearchMatch::new("ITAA 1997 s40-30", "Software may be a depreciating asset."),
            SearchMatch::new("ITAA 1997 s104-10", "CGT event A1 happens on disposal."),
            SearchMatch::new("ITAA 1936 s6", "Definitions."),
        ]
    }

    #[test]
    fn renders_blocks_in_order() {
        let text = render_context(&matches()[..2]).unwrap();
        assert_eq!(
            text,
            "Section: ITAA 1997 s40-30\nSoftware may be a depreciating asset.\n\n\
             Section: ITAA 1997 s104-10\nCGT event A1 happens on disposal."
        );
    }

    #[test]
    fn empty_matches_render_empty() {
        assert_eq!(render_context(&[]).unwrap(), "");
    }

    #[test]
    fn missing_reference_is_an_error() {
        let mut ms = matches();
        ms[1].metadata.clear();
        let err = render_context(&ms).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingReference { position: 1 }));
    }

    #[tokio::test]
    async fn retrieve_passes_k_to_index() {
        let index = Arc::new(StaticIndex::new(matches()));
        let retriever = ContextRetriever::new(index.clone());

        let text = retriever.retrieve_context("software", 2).await.unwrap();

        assert_eq!(text.matches("Section: ").count(), 2);
        assert_eq!(index.calls(), vec![("software".to_string(), 2)]);
    }

    #[tokio::test]
    async fn retrieve_with_no_matches_is_empty() {
        let retriever = ContextRetriever::new(Arc::new(StaticIndex::new(vec![])));
        assert_eq!(retriever.retrieve_context("anything", 4).await.unwrap(), "");
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let retriever = ContextRetriever::new(Arc::new(FailingIndex::new("index unreachable")));
        let err = retriever.retrieve_context("q", 4).await.unwrap_err();
        assert_eq!(err.to_string(), "index unreachable");
    }
}
