//! CLI module for Granska.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Granska - Podcast Fact-Checking
///
/// Transcribes podcast audio, breaks the transcript into atomic factual
/// claims, and verifies each claim against live web evidence. The name
/// "Granska" comes from the Scandinavian word for "scrutinize."
#[derive(Parser, Debug)]
#[command(name = "granska")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
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
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fact-check a local audio file or RSS feed and print the report
    Check {
        /// Local audio file path, or an http(s) RSS feed URL
        input: String,

        /// OpenAI API key (transcription and claim extraction)
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_key: Option<String>,

        /// Perplexity API key (claim verification)
        #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true)]
        perplexity_key: Option<String>,

        /// Write the report as JSON to a file instead of printing it
        #[arg(short, long)]
        output: Option<String>,
    },
}
