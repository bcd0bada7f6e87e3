//! The request shape submitted by the client application.

use serde::{Deserialize, Serialize};

/// A tax-law question plus the six placeholder seed values.
///
/// The seed values show the model the expected field names and format. They
/// are echoed into the prompt and never treated as authoritative output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuery {
    pub query: String,
    pub title: String,
    pub tax_research: String,
    pub tax_citations: String,
    pub draft_client_response: String,
    pub clarifying_questions: String,
    pub confirmation: String,
}

impl TaxQuery {
    /// A query with empty seed values.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}
