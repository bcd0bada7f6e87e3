//! The retrieval-augmented answer pipeline.
//!
//! retrieve context → build prompt → one completion → parse.
//!
//! [`AnswerOrchestrator::try_answer`] reports failures as [`PipelineError`].
//! [`AnswerOrchestrator::answer`] is the single boundary where any failure is
//! replaced by [`AnswerResult::fallback`], so the client always receives a
//! success-shaped payload and real failures are visible only in the logs.

use std::sync::Arc;

use taxlaw_core::config::DEFAULT_TOP_K;
use taxlaw_core::{AnswerResult, TaxQuery};
use taxlaw_store::{ContextRetriever, RetrievalError};
use thiserror::Error;
use tracing::{error, info};

use crate::{CompletionError, HeaderParser, LanguageModel, SectionParser, build_prompt};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Sequences retrieval, prompting, completion and parsing for one question.
///
/// Holds only immutable handles, so one instance can serve concurrent
/// requests.
#[derive(Clone)]
pub struct AnswerOrchestrator {
    retriever: ContextRetriever,
    model: Arc<dyn LanguageModel>,
    parser: Arc<dyn SectionParser>,
    top_k: usize,
}

impl AnswerOrchestrator {
    pub fn new(retriever: ContextRetriever, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            retriever,
            model,
            parser: Arc::new(HeaderParser),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of passages retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn SectionParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Answer a question, substituting the fallback payload on any failure.
    pub async fn answer(&self, query: &TaxQuery) -> AnswerResult {
        match self.try_answer(query).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, query = %query.query, "answer pipeline failed, returning fallback");
                AnswerResult::fallback()
            }
        }
    }

    /// Run the pipeline, reporting the first failing stage.
    pub async fn try_answer(&self, query: &TaxQuery) -> Result<AnswerResult, PipelineError> {
        let context = self
            .retriever
            .retrieve_context(&query.query, self.top_k)
            .await?;

        let prompt = build_prompt(query, &context);
        let completion = self.model.complete(&prompt).await?;

        let (sections, citations) = self.parser.parse(&completion.content);
        info!(
            citations = citations.len(),
            context_chars = context.len(),
            "answered query"
        );
        Ok(AnswerResult::new(sections, citations))
    }
}
