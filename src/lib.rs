//! Granska - Podcast Transcription and Fact-Checking
//!
//! A service that transcribes spoken-word audio, breaks the transcript into
//! atomic factual claims, and checks each claim against web evidence.
//!
//! The name "Granska" comes from the Swedish/Scandinavian word for "scrutinize."
//!
//! # Overview
//!
//! Granska allows you to:
//! - Transcribe an uploaded audio file or the first episode of an RSS podcast feed
//! - Extract atomic factual claims from the transcript
//! - Fact-check each claim against web search evidence, with trusted-source annotation
//! - Run the pipeline asynchronously and poll for a structured, sourced report
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `audio_source` - Audio source abstraction (uploads, RSS feeds)
//! - `transcription` - Speech-to-text transcription
//! - `factcheck` - Claim extraction and verification contracts
//! - `trusted` - Trusted-source registry for evidence annotation
//! - `orchestrator` - The sequential fact-check pipeline
//! - `task` - Asynchronous task lifecycle and durable snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use granska::audio_source::AudioSource;
//! use granska::config::{Prompts, Settings};
//! use granska::task::{AnalyzeRequest, Credentials, JsonTaskStore, LivePipeline, TaskManager};
//! use granska::transcription::WhisperTranscriber;
//! use granska::trusted::TrustedSources;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Arc::new(LivePipeline::new(
//!         settings.clone(),
//!         Prompts::load(None)?,
//!         Arc::new(WhisperTranscriber::new()),
//!         Arc::new(TrustedSources::default()),
//!     ));
//!     let store = Arc::new(JsonTaskStore::new(&settings.outputs_dir())?);
//!     let manager = Arc::new(TaskManager::new(pipeline, store));
//!
//!     let task_id = manager.submit(AnalyzeRequest {
//!         source: AudioSource::Rss { url: "https://example.com/feed.xml".into() },
//!         credentials: Credentials::new(Some("sk-...".into()), Some("pplx-...".into()))?,
//!     });
//!     println!("Submitted task {task_id}");
//!
//!     Ok(())
//! }
//! ```

pub mod audio_source;
pub mod cli;
pub mod config;
pub mod error;
pub mod factcheck;
pub mod openai;
pub mod orchestrator;
pub mod task;
pub mod transcription;
pub mod trusted;

pub use error::{GranskaError, Result};
