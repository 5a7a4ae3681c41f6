use std::sync::Arc;

use crate::error::{Error, Result};
use crate::llm::{CompletionProvider, ReviewPrompt};

/// Sends the review prompt to an ordered list of candidate models.
///
/// The first model that answers wins. A failing model is logged and the next
/// one gets the identical prompt; when every model fails the last error is
/// returned.
pub struct ReviewEngine {
    llm: Arc<dyn CompletionProvider>,
    models: Vec<String>,
}

impl ReviewEngine {
    pub fn new(llm: Arc<dyn CompletionProvider>, models: Vec<String>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::Config("No review models configured".to_string()));
        }
        Ok(Self { llm, models })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub async fn review(&self, prompt: &ReviewPrompt) -> Result<String> {
        let messages = prompt.messages();
        let mut last_error = None;

        for (i, model) in self.models.iter().enumerate() {
            tracing::info!("Requesting review from {} model {}", self.llm.name(), model);

            match self.llm.complete(model, &messages).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => {
                    tracing::warn!("Model {} returned an empty response", model);
                    last_error = Some(Error::LLMApi(format!("Empty response from {}", model)));
                }
                Err(e) => {
                    tracing::warn!("Model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }

            if let Some(next) = self.models.get(i + 1) {
                tracing::info!("Falling back to model {}", next);
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Config("No review models configured".to_string())))
    }
}
