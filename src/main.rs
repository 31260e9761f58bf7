//! Granska CLI entry point.

use anyhow::Result;
use clap::Parser;
use granska::cli::{commands, Cli, Commands};
use granska::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("granska={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.uploads_dir())?;
    std::fs::create_dir_all(settings.outputs_dir())?;

    // Execute command
    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Check {
            input,
            openai_key,
            perplexity_key,
            output,
        } => {
            commands::run_check(&input, openai_key, perplexity_key, output, settings).await?;
        }
    }

    Ok(())
}
