//! Error types for Kort.

use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::summarize::SummarizationError;

/// Library-level error type for Kort operations.
#[derive(Error, Debug)]
pub enum KortError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error("Media source error: {0}")]
    VideoSource(String),

    #[error("Media not found: {0}")]
    VideoNotFound(String),

    #[error("Transcripts are disabled or unavailable: {0}")]
    TranscriptsDisabled(String),

    #[error("Web extraction failed: {0}")]
    WebExtraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Result type alias for Kort operations.
pub type Result<T> = std::result::Result<T, KortError>;
