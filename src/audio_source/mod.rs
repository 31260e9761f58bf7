//! Audio source abstraction for Granska.
//!
//! A task's audio comes either from an uploaded/local file or from the first
//! episode of an RSS podcast feed.

mod rss;

pub use rss::resolve_rss;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the audio for a task comes from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// An uploaded or local audio file.
    Local { path: PathBuf, file_name: String },
    /// An RSS podcast feed; only the first episode's enclosure is used.
    Rss { url: String },
}

/// Kind of audio source, recorded in task metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Rss,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Rss => write!(f, "rss"),
        }
    }
}

impl AudioSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            AudioSource::Local { .. } => SourceKind::Local,
            AudioSource::Rss { .. } => SourceKind::Rss,
        }
    }

    /// Display name recorded in task metadata.
    pub fn file_name(&self) -> String {
        match self {
            AudioSource::Local { file_name, .. } => file_name.clone(),
            AudioSource::Rss { .. } => "RSS Link".to_string(),
        }
    }
}

/// Outcome of resolving a source to a local audio file.
#[derive(Debug, Clone)]
pub enum ResolvedAudio {
    /// A local audio file ready for transcription.
    File(PathBuf),
    /// The feed's first episode carries no audio enclosure. Not an error:
    /// the task proceeds with an empty transcript and zero claims.
    NoAudio,
}

/// Resolve an audio source to a local file, downloading if necessary.
pub async fn resolve(source: &AudioSource, download_dir: &Path) -> Result<ResolvedAudio> {
    match source {
        AudioSource::Local { path, .. } => Ok(ResolvedAudio::File(path.clone())),
        AudioSource::Rss { url } => rss::resolve_rss(url, download_dir).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_for_metadata() {
        let local = AudioSource::Local {
            path: PathBuf::from("/tmp/episode.mp3"),
            file_name: "episode.mp3".to_string(),
        };
        assert_eq!(local.file_name(), "episode.mp3");
        assert_eq!(local.kind(), SourceKind::Local);

        let rss = AudioSource::Rss {
            url: "https://example.com/feed.xml".to_string(),
        };
        assert_eq!(rss.file_name(), "RSS Link");
        assert_eq!(rss.kind(), SourceKind::Rss);
    }
}
