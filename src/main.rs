//! Kort CLI entry point.

use anyhow::Result;
use clap::Parser;
use kort::cli::{commands, Cli, Commands};
use kort::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kort={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Execute command
    match &cli.command {
        Commands::Summarize {
            url,
            api_key,
            model,
            trace,
            json,
        } => {
            commands::run_summarize(url, api_key.clone(), model.clone(), *trace, *json, settings)
                .await?;
        }

        Commands::Extract { url, trace, json } => {
            commands::run_extract(url, *trace, *json, settings).await?;
        }

        Commands::Serve {
            host,
            port,
            api_key,
        } => {
            commands::run_serve(host, *port, api_key.clone(), settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
