//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::KortError;
use crate::extraction::{AttemptOutcome, ExtractedDocument, ExtractionAttempt};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print the strategies tried for a URL, in order.
    pub fn attempts(attempts: &[ExtractionAttempt]) {
        Self::header("Extraction attempts");
        for attempt in attempts {
            match &attempt.outcome {
                AttemptOutcome::Success => println!(
                    "  {} {}",
                    style("✓").green(),
                    style(&attempt.strategy).bold()
                ),
                AttemptOutcome::Failure(reason) => println!(
                    "  {} {} - {}",
                    style("✗").red(),
                    style(&attempt.strategy).bold(),
                    style(reason).dim()
                ),
            }
        }
    }

    /// Print one extracted document with a short preview.
    pub fn document(doc: &ExtractedDocument) {
        println!(
            "\n{} {} ({}, {} chars)",
            style(">>").green(),
            style(doc.title().unwrap_or("Untitled")).bold(),
            style(doc.source().unwrap_or("unknown")).dim(),
            doc.text.chars().count()
        );
        for (key, value) in &doc.metadata {
            if key != "title" && key != "source" {
                Self::kv(key, value);
            }
        }
        println!("   {}", content_preview(&doc.text, 200));
    }

    /// Print a failed request the way a user should see it.
    pub fn failure(err: &KortError, trace: bool) {
        Self::error(&user_message(err));

        if trace {
            if let KortError::Extraction(extraction) = err {
                Self::attempts(extraction.attempts());
            }
            eprintln!("\n{} {:?}", style("debug:").dim(), err);
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Message shown for an error, without the library's category prefix for input problems.
pub fn user_message(err: &KortError) -> String {
    match err {
        KortError::InvalidInput(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
