//! OpenAI-compatible client construction.
//!
//! The summarizer talks to any chat-completions endpoint that speaks the OpenAI
//! wire format (Groq by default), so the base URL and key are explicit.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

use crate::error::{KortError, Result};

/// Default timeout for completion requests (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a chat client for `api_base`, authenticated with `api_key`.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| KortError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    // One attempt per call: provider errors, including 429, go straight back to the caller.
    let no_retry = backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry))
}
