//! Configuration module for Kort.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, PromptSettings, Settings, SummarizerSettings,
};
