//! Asynchronous task lifecycle for Granska.
//!
//! A submitted analysis becomes a background task identified by a UUID.
//! The only observable state is the durable JSON snapshot: processing until
//! the pipeline finishes, then a complete result or a terminal error.

mod runner;
mod store;

pub use runner::{LivePipeline, PipelineOutput, PipelineRunner};
pub use store::JsonTaskStore;

use crate::audio_source::{AudioSource, SourceKind};
use crate::error::{GranskaError, Result};
use crate::factcheck::FactCheckRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

/// Clonable cancellation flag shared between a task and its manager.
///
/// Cancellation is cooperative: the pipeline checks the flag between stages
/// and between claims, so an in-flight verifier call still completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Done,
    Error,
}

/// Run metadata attached to a finished task.
///
/// All fields are optional so a failed or in-flight task serializes as an
/// empty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
}

/// The durable, client-visible state of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    #[serde(default)]
    pub metadata: TaskMetadata,
    #[serde(rename = "data", default)]
    pub records: Vec<FactCheckRecord>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot {
    pub fn processing(task_id: Uuid) -> Self {
        Self {
            task_id,
            metadata: TaskMetadata::default(),
            records: Vec::new(),
            status: TaskStatus::Processing,
            error: None,
        }
    }

    pub fn done(task_id: Uuid, metadata: TaskMetadata, records: Vec<FactCheckRecord>) -> Self {
        Self {
            task_id,
            metadata,
            records,
            status: TaskStatus::Done,
            error: None,
        }
    }

    pub fn failed(task_id: Uuid, message: String) -> Self {
        Self {
            task_id,
            metadata: TaskMetadata::default(),
            records: Vec::new(),
            status: TaskStatus::Error,
            error: Some(message),
        }
    }
}

/// Per-submission API credentials. Both keys are required up front so a task
/// cannot fail on a missing key minutes into a transcription.
#[derive(Clone)]
pub struct Credentials {
    pub openai_key: String,
    pub perplexity_key: String,
}

impl Credentials {
    pub fn new(openai_key: Option<String>, perplexity_key: Option<String>) -> Result<Self> {
        match (
            openai_key.filter(|k| !k.trim().is_empty()),
            perplexity_key.filter(|k| !k.trim().is_empty()),
        ) {
            (Some(openai_key), Some(perplexity_key)) => Ok(Self {
                openai_key,
                perplexity_key,
            }),
            _ => Err(GranskaError::InvalidInput(
                "Both OpenAI and Perplexity API keys are required".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_key", &"<redacted>")
            .field("perplexity_key", &"<redacted>")
            .finish()
    }
}

/// One analysis submission.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub source: AudioSource,
    pub credentials: Credentials,
}

/// Owns running tasks: spawns the pipeline, persists outcomes, and routes
/// cancellation to the right flag.
pub struct TaskManager {
    runner: Arc<dyn PipelineRunner>,
    store: Arc<JsonTaskStore>,
    cancel_flags: Mutex<HashMap<Uuid, CancelFlag>>,
}

impl TaskManager {
    pub fn new(runner: Arc<dyn PipelineRunner>, store: Arc<JsonTaskStore>) -> Self {
        Self {
            runner,
            store,
            cancel_flags: Mutex::new(HashMap::new()),
        }
    }

    /// Start a task and return its id immediately.
    pub fn submit(self: &Arc<Self>, request: AnalyzeRequest) -> Uuid {
        let task_id = Uuid::new_v4();
        let cancel = CancelFlag::new();
        self.cancel_flags
            .lock()
            .expect("cancel flag lock poisoned")
            .insert(task_id, cancel.clone());

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.execute(task_id, request, cancel).await;
        });

        task_id
    }

    async fn execute(&self, task_id: Uuid, request: AnalyzeRequest, cancel: CancelFlag) {
        info!(%task_id, source = %request.source.kind(), "Task started");

        let snapshot = match self.runner.run(&request, &cancel).await {
            Ok(output) => {
                info!(%task_id, records = output.records.len(), "Task finished");
                TaskSnapshot::done(task_id, output.metadata, output.records)
            }
            Err(e) => {
                error!(%task_id, "Task failed: {}", e);
                TaskSnapshot::failed(task_id, e.to_string())
            }
        };

        if let Err(e) = self.store.write(&snapshot).await {
            error!(%task_id, "Failed to persist task snapshot: {}", e);
        }

        self.cancel_flags
            .lock()
            .expect("cancel flag lock poisoned")
            .remove(&task_id);
    }

    /// Current snapshot for a task; unknown ids read as processing.
    pub async fn status(&self, task_id: Uuid) -> Result<TaskSnapshot> {
        self.store.read(task_id).await
    }

    /// Request cancellation. Always acknowledged: a finished or unknown task
    /// simply has no flag left to set.
    pub fn cancel(&self, task_id: Uuid) {
        let flags = self.cancel_flags.lock().expect("cancel flag lock poisoned");
        if let Some(flag) = flags.get(&task_id) {
            flag.cancel();
            info!(%task_id, "Cancellation requested");
        }
    }

    pub fn store(&self) -> &Arc<JsonTaskStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    async fn wait_for_terminal(manager: &TaskManager, task_id: Uuid) -> TaskSnapshot {
        for _ in 0..100 {
            let snapshot = manager.status(task_id).await.unwrap();
            if snapshot.status != TaskStatus::Processing {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never reached a terminal state", task_id);
    }

    fn request() -> AnalyzeRequest {
        AnalyzeRequest {
            source: AudioSource::Rss {
                url: "https://example.com/feed.xml".to_string(),
            },
            credentials: Credentials::new(Some("sk-a".to_string()), Some("pplx-b".to_string()))
                .unwrap(),
        }
    }

    struct OkRunner;

    #[async_trait]
    impl PipelineRunner for OkRunner {
        async fn run(&self, request: &AnalyzeRequest, _: &CancelFlag) -> Result<PipelineOutput> {
            Ok(PipelineOutput {
                metadata: TaskMetadata {
                    file_name: Some(request.source.file_name()),
                    record_count: Some(0),
                    ..Default::default()
                },
                records: Vec::new(),
            })
        }
    }

    struct FailRunner;

    #[async_trait]
    impl PipelineRunner for FailRunner {
        async fn run(&self, _: &AnalyzeRequest, _: &CancelFlag) -> Result<PipelineOutput> {
            Err(GranskaError::Transcription("audio unreadable".to_string()))
        }
    }

    /// Spins until cancelled, like a long claim loop would.
    struct SpinRunner;

    #[async_trait]
    impl PipelineRunner for SpinRunner {
        async fn run(&self, _: &AnalyzeRequest, cancel: &CancelFlag) -> Result<PipelineOutput> {
            loop {
                if cancel.is_cancelled() {
                    return Err(GranskaError::Cancelled);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    }

    fn manager(runner: Arc<dyn PipelineRunner>) -> (Arc<TaskManager>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonTaskStore::new(dir.path()).unwrap());
        (Arc::new(TaskManager::new(runner, store)), dir)
    }

    #[tokio::test]
    async fn test_successful_task_reaches_done() {
        let (manager, _dir) = manager(Arc::new(OkRunner));
        let task_id = manager.submit(request());

        let snapshot = wait_for_terminal(&manager, task_id).await;
        assert_eq!(snapshot.status, TaskStatus::Done);
        assert_eq!(snapshot.metadata.file_name.as_deref(), Some("RSS Link"));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_task_records_error() {
        let (manager, _dir) = manager(Arc::new(FailRunner));
        let task_id = manager.submit(request());

        let snapshot = wait_for_terminal(&manager, task_id).await;
        assert_eq!(snapshot.status, TaskStatus::Error);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Transcription failed: audio unreadable")
        );
    }

    #[tokio::test]
    async fn test_cancel_produces_terminal_error() {
        let (manager, _dir) = manager(Arc::new(SpinRunner));
        let task_id = manager.submit(request());

        manager.cancel(task_id);

        let snapshot = wait_for_terminal(&manager, task_id).await;
        assert_eq!(snapshot.status, TaskStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("task cancelled"));
    }

    #[tokio::test]
    async fn test_unknown_task_polls_as_processing() {
        let (manager, _dir) = manager(Arc::new(OkRunner));
        let snapshot = manager.status(Uuid::new_v4()).await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Processing);
    }

    #[test]
    fn test_credentials_require_both_keys() {
        assert!(Credentials::new(Some("a".to_string()), Some("b".to_string())).is_ok());
        assert!(Credentials::new(None, Some("b".to_string())).is_err());
        assert!(Credentials::new(Some("a".to_string()), Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_snapshot_serialization_shapes() {
        let id = Uuid::new_v4();

        let failed = serde_json::to_value(TaskSnapshot::failed(id, "boom".to_string())).unwrap();
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["error"], "boom");
        assert_eq!(failed["metadata"], serde_json::json!({}));
        assert_eq!(failed["data"], serde_json::json!([]));

        let processing = serde_json::to_value(TaskSnapshot::processing(id)).unwrap();
        assert_eq!(processing["status"], "processing");
        assert!(processing.get("error").is_none());
    }
}
