//! Structured answer types and the six-section vocabulary.
//!
//! The model is asked to answer in six sections, each opened by a bracketed
//! header token on its own line. [`Section`] names those sections and maps
//! them to their header token, their JSON key and their default text.

use serde::{Deserialize, Serialize};

use crate::TaxQuery;

/// One of the six answer sections, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    TaxResearch,
    TaxCitations,
    DraftClientResponse,
    ClarifyingQuestions,
    Confirmation,
}

impl Section {
    /// All sections in the order the model must emit them.
    pub const ALL: [Section; 6] = [
        Section::Title,
        Section::TaxResearch,
        Section::TaxCitations,
        Section::DraftClientResponse,
        Section::ClarifyingQuestions,
        Section::Confirmation,
    ];

    /// The literal header token that opens this section.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Title => "[TITLE]",
            Self::TaxResearch => "[TAX_RESEARCH]",
            Self::TaxCitations => "[TAX_CITATIONS]",
            Self::DraftClientResponse => "[DRAFT_CLIENT_RESPONSE]",
            Self::ClarifyingQuestions => "[CLARIFYING_QUESTIONS]",
            Self::Confirmation => "[CONFIRMATION]",
        }
    }

    /// The JSON field name used in requests and responses.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::TaxResearch => "tax_research",
            Self::TaxCitations => "tax_citations",
            Self::DraftClientResponse => "draft_client_response",
            Self::ClarifyingQuestions => "clarifying_questions",
            Self::Confirmation => "confirmation",
        }
    }

    /// Text used when the model omits the section or leaves it empty.
    ///
    /// Clients surface these strings to end users, so they are fixed.
    pub fn default_text(&self) -> &'static str {
        match self {
            Self::Title => "Untitled",
            Self::TaxResearch => "No research provided",
            Self::TaxCitations => "No citations provided",
            Self::DraftClientResponse => "No response drafted",
            Self::ClarifyingQuestions => "No clarifying questions",
            Self::Confirmation => "No confirmation provided",
        }
    }

    /// Match a line against the header tokens. Exact after trimming.
    pub fn from_header(line: &str) -> Option<Section> {
        let line = line.trim();
        Self::ALL.into_iter().find(|s| s.header() == line)
    }

    /// The caller's placeholder value for this section.
    pub fn seed<'a>(&self, query: &'a TaxQuery) -> &'a str {
        match self {
            Self::Title => &query.title,
            Self::TaxResearch => &query.tax_research,
            Self::TaxCitations => &query.tax_citations,
            Self::DraftClientResponse => &query.draft_client_response,
            Self::ClarifyingQuestions => &query.clarifying_questions,
            Self::Confirmation => &query.confirmation,
        }
    }
}

/// The six parsed answer sections. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSections {
    pub title: String,
    pub tax_research: String,
    pub tax_citations: String,
    pub draft_client_response: String,
    pub clarifying_questions: String,
    pub confirmation: String,
}

impl Default for ParsedSections {
    fn default() -> Self {
        Self {
            title: Section::Title.default_text().to_string(),
            tax_research: Section::TaxResearch.default_text().to_string(),
            tax_citations: Section::TaxCitations.default_text().to_string(),
            draft_client_response: Section::DraftClientResponse.default_text().to_string(),
            clarifying_questions: Section::ClarifyingQuestions.default_text().to_string(),
            confirmation: Section::Confirmation.default_text().to_string(),
        }
    }
}

impl ParsedSections {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Title => &self.title,
            Section::TaxResearch => &self.tax_research,
            Section::TaxCitations => &self.tax_citations,
            Section::DraftClientResponse => &self.draft_client_response,
            Section::ClarifyingQuestions => &self.clarifying_questions,
            Section::Confirmation => &self.confirmation,
        }
    }

    pub fn set(&mut self, section: Section, value: String) {
        let slot = match section {
            Section::Title => &mut self.title,
            Section::TaxResearch => &mut self.tax_research,
            Section::TaxCitations => &mut self.tax_citations,
            Section::DraftClientResponse => &mut self.draft_client_response,
            Section::ClarifyingQuestions => &mut self.clarifying_questions,
            Section::Confirmation => &mut self.confirmation,
        };
        *slot = value;
    }
}

/// A single citation extracted from a `name | url` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub citations_name: String,
    pub citation_url: String,
}

/// The payload returned to the client: six sections plus citations.
///
/// Serialised flat, with the section keys and `citations` at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(flatten)]
    pub sections: ParsedSections,
    #[serde(default)]
    pub citations: Vec<CitationRecord>,
}

impl AnswerResult {
    pub fn new(sections: ParsedSections, citations: Vec<CitationRecord>) -> Self {
        Self {
            sections,
            citations,
        }
    }

    /// The fixed payload returned when any pipeline stage fails.
    ///
    /// Callers cannot tell this apart from a model answer except by its
    /// literal content.
    pub fn fallback() -> Self {
        Self {
            sections: ParsedSections {
                title: "Error Processing Query".to_string(),
                tax_research: "An error occurred while processing your query.".to_string(),
                tax_citations: "No citations available".to_string(),
                draft_client_response: "Unable to generate response at this time.".to_string(),
                clarifying_questions: "Service temporarily unavailable.".to_string(),
                confirmation: "Error occurred during processing.".to_string(),
            },
            citations: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}
