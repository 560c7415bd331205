//! Pre-flight checks before network work.
//!
//! Hard failures stop the command; soft ones are returned as warnings because
//! the extraction chain can still fall back to other strategies.

use crate::config::Settings;
use crate::error::{KortError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Summarizing needs a usable provider endpoint.
    Summarize,
    /// Extraction has no hard requirements.
    Extract,
}

/// Run pre-flight checks for the given operation.
///
/// Returns warnings for missing optional tools, or an error describing what
/// would make the operation fail outright.
pub fn check(operation: Operation, settings: &Settings) -> Result<Vec<String>> {
    if let Operation::Summarize = operation {
        check_api_base(&settings.summarizer.api_base)?;
    }

    let mut warnings = Vec::new();
    if let Err(e) = check_tool(&settings.extraction.ytdlp_path) {
        warnings.push(format!(
            "{}; video URLs will rely on the transcript fallbacks",
            e
        ));
    }
    Ok(warnings)
}

/// Check that the summary endpoint is an absolute http(s) URL.
fn check_api_base(api_base: &str) -> Result<()> {
    match url::Url::parse(api_base) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(KortError::Config(format!(
            "summarizer.api_base must be an http(s) URL, got '{}'",
            api_base
        ))),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(KortError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KortError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(KortError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
