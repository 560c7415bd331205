//! Kort - URL Summarization
//!
//! A CLI tool that turns a YouTube video or web page into a short summary
//! written by a hosted language model.
//!
//! The name "Kort" is Norwegian for "short."
//!
//! # Overview
//!
//! Kort:
//! - Classifies a URL as a video or a generic web page
//! - Extracts text, falling back through several caption strategies for videos
//! - Sends the text to an OpenAI-compatible chat endpoint (Groq by default)
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `source` - URL validation, classification and video ID parsing
//! - `extraction` - Strategy chain producing plain-text documents
//! - `summarize` - Prompt rendering and the provider call
//! - `pipeline` - Request coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kort::config::Settings;
//! use kort::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     let api_key = std::env::var("GROQ_API_KEY")?;
//!     let outcome = pipeline
//!         .summarize("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &api_key)
//!         .await?;
//!     println!("{}", outcome.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod openai;
pub mod pipeline;
pub mod source;
pub mod summarize;

pub use error::{KortError, Result};
