pub mod answer;
pub mod config;
pub mod document;
pub mod query;

pub use answer::{AnswerResult, CitationRecord, ParsedSections, Section};
pub use document::{DocumentRequest, DocumentText};
pub use query::TaxQuery;
