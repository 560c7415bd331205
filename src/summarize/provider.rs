//! Chat-completions summary provider.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{SummarizationError, SummaryProvider};
use crate::config::SummarizerSettings;
use crate::openai::create_client_with_timeout;

/// Provider for any OpenAI-compatible chat-completions endpoint (Groq by default).
pub struct ChatCompletionProvider {
    api_base: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl ChatCompletionProvider {
    pub fn new(settings: &SummarizerSettings) -> Self {
        Self {
            api_base: settings.api_base.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Override the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SummaryProvider for ChatCompletionProvider {
    #[instrument(skip(self, prompt, api_key), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, api_key: &str) -> Result<String, SummarizationError> {
        let client = create_client_with_timeout(&self.api_base, api_key, self.timeout)
            .map_err(|e| SummarizationError::ProviderError(e.to_string()))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| SummarizationError::ProviderError(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SummarizationError::ProviderError(e.to_string()))?;

        let response = client.chat().create(request).await.map_err(|e| {
            SummarizationError::ProviderError(format!("Failed to generate summary: {}", e))
        })?;

        let summary = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                SummarizationError::ProviderError("Empty response from provider".to_string())
            })?;

        debug!("Received {} chars of summary", summary.len());
        Ok(summary)
    }
}
