//! Configuration settings for Granska.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub storage: StorageSettings,
    pub transcription: TranscriptionSettings,
    pub extraction: ExtractionSettings,
    pub verification: VerificationSettings,
    pub trusted_sources: TrustedSourceSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.granska".to_string(),
        }
    }
}

/// Storage locations for uploads and task snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for uploaded and downloaded audio files.
    pub uploads_dir: String,
    /// Directory for persisted task result documents.
    pub outputs_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            uploads_dir: "~/.granska/uploads".to_string(),
            outputs_dir: "~/.granska/outputs".to_string(),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Speech-to-text model to use.
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
        }
    }
}

/// Claim extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Chat model used to break the transcript into atomic claims.
    pub model: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-5-mini".to_string(),
        }
    }
}

/// Claim verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    /// Search-augmented model used to fact-check claims.
    pub model: String,
    /// Base URL of the verification API.
    pub api_base: String,
    /// Web search context size requested per verification call.
    pub search_context_size: String,
    /// Number of recently verified claims supplied as context.
    pub context_window: usize,
    /// Maximum attempts per claim when the verifier returns malformed output.
    pub max_retries: usize,
    /// Base backoff between retries, doubled after each failed attempt.
    pub retry_backoff_ms: u64,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            model: "sonar".to_string(),
            api_base: "https://api.perplexity.ai".to_string(),
            search_context_size: "medium".to_string(),
            context_window: 5,
            max_retries: 5,
            retry_backoff_ms: 500,
        }
    }
}

/// Trusted-source registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustedSourceSettings {
    /// CSV file of `url,label` rows on a 1-6 reliability scale.
    pub csv_path: String,
    /// Minimum label for an entry to be retained.
    pub threshold: u8,
}

impl Default for TrustedSourceSettings {
    fn default() -> Self {
        Self {
            csv_path: "~/.granska/trusted_sources.csv".to_string(),
            threshold: 5,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GranskaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("granska")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded uploads directory path.
    pub fn uploads_dir(&self) -> PathBuf {
        Self::expand_path(&self.storage.uploads_dir)
    }

    /// Get the expanded outputs directory path.
    pub fn outputs_dir(&self) -> PathBuf {
        Self::expand_path(&self.storage.outputs_dir)
    }

    /// Get the expanded trusted sources CSV path.
    pub fn trusted_csv_path(&self) -> PathBuf {
        Self::expand_path(&self.trusted_sources.csv_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.extraction.model, "gpt-5-mini");
        assert_eq!(settings.verification.model, "sonar");
        assert_eq!(settings.verification.context_window, 5);
        assert_eq!(settings.trusted_sources.threshold, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [verification]
            max_retries = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.verification.max_retries, 3);
        assert_eq!(settings.verification.model, "sonar");
        assert_eq!(settings.server.port, 8000);
    }
}
