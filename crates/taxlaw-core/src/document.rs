//! Shared types for the document text-extraction service.

use serde::{Deserialize, Serialize};

/// A request to download a document and bind its text to a client variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub url: String,
    /// Name of the client-side variable the extracted text is stored in.
    pub flow_variable: String,
}

/// Extracted document text, returned under the requested variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    pub status: String,
    pub variable_name: String,
    pub text: String,
    pub message: String,
}

impl DocumentText {
    pub fn success(variable_name: &str, text: String) -> Self {
        Self {
            status: "success".to_string(),
            variable_name: variable_name.to_string(),
            text,
            message: format!("Document processed and stored in {variable_name}"),
        }
    }
}
