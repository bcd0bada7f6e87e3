//! HTTP client that downloads documents and extracts their text.

use std::time::Duration;

use taxlaw_core::{DocumentRequest, DocumentText};
use thiserror::Error;
use tracing::info;

use crate::extract_docx_text;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid document archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// True when the document could not be fetched, as opposed to read.
    pub fn is_download(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Server { .. })
    }
}

/// Downloads `.docx` files and returns their paragraph text.
pub struct DocumentClient {
    client: reqwest::Client,
}

impl DocumentClient {
    pub fn new(timeout: Duration) -> Result<Self, DocumentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch the raw bytes at `url`. Non-2xx responses are errors.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, DocumentError> {
        info!(url = %url, "downloading document");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DocumentError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        info!(bytes = bytes.len(), "downloaded document");
        Ok(bytes.to_vec())
    }

    /// Download the requested document and bind its text to the flow variable.
    pub async fn process(&self, request: &DocumentRequest) -> Result<DocumentText, DocumentError> {
        let bytes = self.download(&request.url).await?;
        let text = extract_docx_text(&bytes)?;
        info!(
            variable = %request.flow_variable,
            chars = text.len(),
            "extracted document text"
        );
        Ok(DocumentText::success(&request.flow_variable, text))
    }
}
