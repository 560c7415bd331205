//! Summarization: extracted documents in, one summary string out.
//!
//! All documents are stuffed into a single prompt and sent in one request; there
//! is no chunking or map-reduce.

mod provider;

pub use provider::ChatCompletionProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::extraction::ExtractedDocument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizationError {
    #[error("Summarization provider error: {0}")]
    ProviderError(String),

    #[error("Nothing to summarize: no documents with text were supplied")]
    EmptyInput,
}

/// A hosted text-generation service.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Generate text for a fully rendered prompt.
    async fn complete(&self, prompt: &str, api_key: &str) -> Result<String, SummarizationError>;
}

/// Renders documents into the summary prompt and invokes the provider.
pub struct Summarizer {
    provider: Arc<dyn SummaryProvider>,
    prompts: Prompts,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn SummaryProvider>) -> Self {
        Self {
            provider,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the prompt for `documents`, or `None` if none of them carry text.
    pub fn render_prompt(&self, documents: &[ExtractedDocument]) -> Option<String> {
        let text = documents
            .iter()
            .filter(|d| !d.is_blank())
            .map(|d| d.text.trim())
            .collect::<Vec<_>>()
            .join("\n\n");

        (!text.is_empty()).then(|| self.prompts.render_summary(&text))
    }

    /// Summarize `documents` in a single provider request.
    #[instrument(skip(self, documents, api_key), fields(documents = documents.len()))]
    pub async fn summarize(
        &self,
        documents: &[ExtractedDocument],
        api_key: &str,
    ) -> Result<String, SummarizationError> {
        let prompt = self
            .render_prompt(documents)
            .ok_or(SummarizationError::EmptyInput)?;

        info!("Requesting summary ({} prompt chars)", prompt.len());
        self.provider.complete(&prompt, api_key).await
    }
}
