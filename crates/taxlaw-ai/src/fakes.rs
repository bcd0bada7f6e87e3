//! In-memory fakes for [`LanguageModel`] (testing only).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Completion, CompletionError, LanguageModel};

/// Model that always answers with the same text and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(Completion {
            content: self.response.clone(),
        })
    }
}

/// Model whose every call fails with [`CompletionError::Other`].
#[derive(Debug)]
pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _prompt: &str) -> Result<Completion, CompletionError> {
        Err(CompletionError::Other(self.message.clone()))
    }
}
