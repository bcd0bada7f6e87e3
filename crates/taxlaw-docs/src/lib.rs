//! Document service: download a `.docx` by URL and extract its paragraph text.

mod docx;
pub use docx::extract_docx_text;

pub mod http;
pub use http::{DocumentClient, DocumentError};
