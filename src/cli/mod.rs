//! CLI module for Kort.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kort - URL Summarization
///
/// Summarizes a YouTube video or a web page with a hosted language model.
/// The name "Kort" is Norwegian for "short."
#[derive(Parser, Debug)]
#[command(name = "kort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a YouTube video or web page
    Summarize {
        /// YouTube or website URL
        url: String,

        /// Groq API key
        #[arg(short = 'k', long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Override the summary model
        #[arg(short, long)]
        model: Option<String>,

        /// Show which extraction strategies were tried
        #[arg(long)]
        trace: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract text from a URL without summarizing it
    Extract {
        /// YouTube or website URL
        url: String,

        /// Show which extraction strategies were tried
        #[arg(long)]
        trace: bool,

        /// Print the documents as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Key used when a request does not carry its own
        #[arg(short = 'k', long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
