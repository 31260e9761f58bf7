//! One-shot fact-check of a local file or RSS feed from the command line.

use crate::audio_source::AudioSource;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::GranskaError;
use crate::task::{
    AnalyzeRequest, CancelFlag, Credentials, LivePipeline, PipelineRunner,
};
use crate::transcription::WhisperTranscriber;
use crate::trusted::TrustedSources;
use std::path::PathBuf;
use std::sync::Arc;

/// Run the full pipeline in the foreground and print or save the report.
pub async fn run_check(
    input: &str,
    openai_key: Option<String>,
    perplexity_key: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let source = if input.starts_with("http://") || input.starts_with("https://") {
        AudioSource::Rss {
            url: input.to_string(),
        }
    } else {
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(GranskaError::InvalidInput(format!(
                "Audio file not found: {}",
                path.display()
            ))
            .into());
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();
        AudioSource::Local { path, file_name }
    };

    let credentials = Credentials::new(openai_key, perplexity_key)?;

    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let csv_path = settings.trusted_csv_path();
    let trusted = if csv_path.exists() {
        TrustedSources::load(&csv_path, settings.trusted_sources.threshold)?
    } else {
        TrustedSources::default()
    };

    let transcriber = Arc::new(WhisperTranscriber::with_model(&settings.transcription.model));
    let pipeline = LivePipeline::new(settings, prompts, transcriber, Arc::new(trusted));

    Output::info(&format!("Fact-checking {}", source.file_name()));
    let result = pipeline
        .run(
            &AnalyzeRequest {
                source,
                credentials,
            },
            &CancelFlag::new(),
        )
        .await?;

    match output {
        Some(path) => {
            let report = serde_json::json!({
                "metadata": result.metadata,
                "data": result.records,
            });
            std::fs::write(&path, serde_json::to_vec_pretty(&report)?)?;
            Output::success(&format!(
                "Wrote {} fact-checked claims to {}",
                result.records.len(),
                path
            ));
        }
        None => {
            Output::header("Fact-Check Report");
            if result.records.is_empty() {
                Output::warning("No verifiable claims found.");
            }
            for record in &result.records {
                Output::record(record);
            }
            println!();
            Output::success(&format!("{} claims checked", result.records.len()));
        }
    }

    Ok(())
}
