//! Answer pipeline: prompt protocol, LLM integration, and response parsing.

pub mod fakes;
mod llm;
pub use llm::{Completion, CompletionError, LanguageModel, OpenAiChat};

mod parser;
pub use parser::{HeaderParser, SectionParser, extract_citations, parse_response};

mod pipeline;
pub use pipeline::{AnswerOrchestrator, PipelineError};

mod prompt;
pub use prompt::build_prompt;
