//! Durable JSON storage for task snapshots.

use super::TaskSnapshot;
use crate::error::{GranskaError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// One-JSON-file-per-task snapshot store.
///
/// Each write replaces the task's whole document, so a snapshot on disk is
/// always a complete result and survives process restarts.
pub struct JsonTaskStore {
    dir: PathBuf,
}

impl JsonTaskStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            GranskaError::Storage(format!(
                "Failed to create output directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path_for(&self, task_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", task_id))
    }

    /// Persist a snapshot, replacing any previous one for the task.
    pub async fn write(&self, snapshot: &TaskSnapshot) -> Result<()> {
        let path = self.path_for(snapshot.task_id);
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            GranskaError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!(task_id = %snapshot.task_id, "Snapshot persisted");
        Ok(())
    }

    /// Read a task's snapshot.
    ///
    /// A missing file reads as a processing snapshot: an unknown id is
    /// indistinguishable from a task that has not yet written its result.
    pub async fn read(&self, task_id: Uuid) -> Result<TaskSnapshot> {
        match self.read_raw(task_id).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(TaskSnapshot::processing(task_id)),
        }
    }

    /// Read a task's snapshot as raw bytes, None when absent.
    pub async fn read_raw(&self, task_id: Uuid) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(task_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GranskaError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskMetadata, TaskStatus};

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTaskStore::new(dir.path()).unwrap();

        let id = Uuid::new_v4();
        let snapshot = TaskSnapshot::done(
            id,
            TaskMetadata {
                file_name: Some("episode.mp3".to_string()),
                record_count: Some(0),
                ..Default::default()
            },
            Vec::new(),
        );
        store.write(&snapshot).await.unwrap();

        let read = store.read(id).await.unwrap();
        assert_eq!(read.task_id, id);
        assert_eq!(read.status, TaskStatus::Done);
        assert_eq!(read.metadata.file_name.as_deref(), Some("episode.mp3"));
    }

    #[tokio::test]
    async fn test_missing_task_reads_as_processing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTaskStore::new(dir.path()).unwrap();

        let id = Uuid::new_v4();
        let snapshot = store.read(id).await.unwrap();
        assert_eq!(snapshot.task_id, id);
        assert_eq!(snapshot.status, TaskStatus::Processing);
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn test_read_raw_absent_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTaskStore::new(dir.path()).unwrap();

        let id = Uuid::new_v4();
        assert!(store.read_raw(id).await.unwrap().is_none());

        let snapshot = TaskSnapshot::failed(id, "boom".to_string());
        store.write(&snapshot).await.unwrap();

        let bytes = store.read_raw(id).await.unwrap().unwrap();
        let parsed: TaskSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.status, TaskStatus::Error);
        assert_eq!(parsed.error.as_deref(), Some("boom"));
    }
}
