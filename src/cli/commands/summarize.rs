//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(
    url: &str,
    api_key: Option<String>,
    model: Option<String>,
    trace: bool,
    json: bool,
    mut settings: Settings,
) -> Result<()> {
    match preflight::check(Operation::Summarize, &settings) {
        Ok(warnings) => {
            for warning in warnings {
                Output::warning(&warning);
            }
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'kort doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    if let Some(model) = model {
        settings.summarizer.model = model;
    }

    let pipeline = Pipeline::new(&settings)?;
    let api_key = api_key.unwrap_or_default();

    let spinner = Output::spinner("Processing...");
    let result = pipeline.summarize(url, &api_key).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::failure(&e, trace);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    Output::success("Summary generated successfully!");
    if let Some(title) = outcome.title() {
        Output::header(title);
    }
    println!("\n{}\n", outcome.summary.trim());

    if trace {
        Output::attempts(&outcome.attempts);
    }

    Ok(())
}
