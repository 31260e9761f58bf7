//! Speech-to-text transcription for Granska.
//!
//! Transcription is an opaque capability from the pipeline's point of view:
//! audio file in, plain transcript text out.

mod whisper;

pub use whisper::{is_api_key_configured, WhisperTranscriber};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into plain text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
