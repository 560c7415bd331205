//! Extract command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the extract command.
pub async fn run_extract(url: &str, trace: bool, json: bool, settings: Settings) -> Result<()> {
    for warning in preflight::check(Operation::Extract, &settings)? {
        Output::warning(&warning);
    }

    let pipeline = Pipeline::new(&settings)?;

    let spinner = Output::spinner("Extracting...");
    let result = pipeline.extract(url).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            Output::failure(&e, trace);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    Output::success(&format!("Extracted {} document(s)", report.documents.len()));
    for doc in &report.documents {
        Output::document(doc);
    }

    if trace {
        Output::attempts(&report.attempts);
    }

    Ok(())
}
