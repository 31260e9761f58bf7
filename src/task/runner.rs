//! The end-to-end pipeline behind a task.

use super::{AnalyzeRequest, CancelFlag, TaskMetadata};
use crate::audio_source::{self, ResolvedAudio};
use crate::config::{Prompts, Settings};
use crate::error::{GranskaError, Result};
use crate::factcheck::{FactCheckRecord, OpenAiExtractor, SonarVerifier};
use crate::orchestrator::{Orchestrator, RetryPolicy};
use crate::transcription::Transcriber;
use crate::trusted::TrustedSources;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What a completed pipeline run hands back to the task manager.
pub struct PipelineOutput {
    pub metadata: TaskMetadata,
    pub records: Vec<FactCheckRecord>,
}

/// Runs the full audio-to-report pipeline for one request.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    async fn run(&self, request: &AnalyzeRequest, cancel: &CancelFlag) -> Result<PipelineOutput>;
}

/// The production pipeline: resolve audio, transcribe, extract, verify.
///
/// The extractor and verifier are built per request from the submitted
/// credentials; the transcriber is shared and uses the ambient OpenAI key.
pub struct LivePipeline {
    settings: Settings,
    prompts: Prompts,
    transcriber: Arc<dyn Transcriber>,
    trusted: Arc<TrustedSources>,
}

impl LivePipeline {
    pub fn new(
        settings: Settings,
        prompts: Prompts,
        transcriber: Arc<dyn Transcriber>,
        trusted: Arc<TrustedSources>,
    ) -> Self {
        Self {
            settings,
            prompts,
            transcriber,
            trusted,
        }
    }
}

#[async_trait]
impl PipelineRunner for LivePipeline {
    async fn run(&self, request: &AnalyzeRequest, cancel: &CancelFlag) -> Result<PipelineOutput> {
        let resolved = audio_source::resolve(&request.source, &self.settings.uploads_dir()).await?;
        if cancel.is_cancelled() {
            return Err(GranskaError::Cancelled);
        }

        let transcript = match &resolved {
            ResolvedAudio::File(path) => self.transcriber.transcribe(path).await?,
            ResolvedAudio::NoAudio => {
                info!("No audio enclosure found, continuing with empty transcript");
                String::new()
            }
        };
        if cancel.is_cancelled() {
            return Err(GranskaError::Cancelled);
        }

        let extractor = OpenAiExtractor::new(
            &request.credentials.openai_key,
            &self.settings.extraction.model,
            &self.prompts,
        );
        let verifier = SonarVerifier::new(
            &request.credentials.perplexity_key,
            &self.settings.verification.model,
            &self.settings.verification.api_base,
            &self.settings.verification.search_context_size,
            &self.prompts,
        );

        let orchestrator =
            Orchestrator::new(Arc::new(extractor), Arc::new(verifier), Arc::clone(&self.trusted))
                .with_window_capacity(self.settings.verification.context_window)
                .with_retry_policy(RetryPolicy {
                    max_attempts: self.settings.verification.max_retries,
                    backoff: Duration::from_millis(self.settings.verification.retry_backoff_ms),
                });

        let records = orchestrator.run(&transcript, cancel).await?;

        let metadata = TaskMetadata {
            finished_time: Some(Utc::now()),
            file_name: Some(request.source.file_name()),
            extraction_model: Some(self.settings.extraction.model.clone()),
            verification_model: Some(self.settings.verification.model.clone()),
            source: Some(request.source.kind()),
            record_count: Some(records.len()),
        };

        Ok(PipelineOutput { metadata, records })
    }
}
