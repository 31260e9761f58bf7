//! Error types for Granska.

use thiserror::Error;

/// Library-level error type for Granska operations.
#[derive(Error, Debug)]
pub enum GranskaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Claim extraction failed: {0}")]
    Extraction(String),

    #[error("Claim verification failed: {0}")]
    Verification(String),

    #[error("Malformed verifier output: {0}")]
    VerifierFormat(String),

    #[error("Task storage error: {0}")]
    Storage(String),

    #[error("task cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Granska operations.
pub type Result<T> = std::result::Result<T, GranskaError>;
