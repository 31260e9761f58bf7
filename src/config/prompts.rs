//! Prompt templates for Granska.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub extraction: ExtractionPrompts,
    pub verification: VerificationPrompts,
}

/// Prompts for breaking a transcript into atomic claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub system: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            system: r#"Please break down the following transcript into independent atomic facts. Ignore basic information about the podcast, such as the name and host. Ignore promotional/ad content. Ignore personal anecdotes.

Respond with only a JSON array of single-key objects numbering each fact, and nothing else. Here is one example:

Input: "She currently stars in the romantic comedy series, Love and Destiny, which premiered in 2019."
Output: [ {"1": "She currently stars in Love and Destiny."}, {"2": "Love and Destiny is a romantic comedy series."}, {"3": "Love and Destiny premiered in 2019."} ]"#
                .to_string(),
        }
    }
}

/// Prompts for fact-checking a single claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationPrompts {
    pub system: String,
}

impl Default for VerificationPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a fact-checker. Please check the accuracy of the provided claim, taking into account any previous claims provided as context. Return one of these ratings:
true, false, misleading/partially true, unverifiable.
Do not add any explanations or extraneous formatting.
Here are 4 examples:

Input: "Antonio Guterres is the UN Secretary General"
Output: "true"

Input: "Many of the Maldivians inducted into the Islamic State have come back to the Maldives"
Output: "false"

Input: "The Pakistani state supports or turns a blind eye to acts of terrorism"
Output: "misleading/partially true"

Input: "Governments can kill bitcoin by making the economic incentive to use it irrelevant"
Output: "unverifiable"
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the defaults, with optional custom directory overrides.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let extraction_path = custom_path.join("extraction.toml");
            if extraction_path.exists() {
                let content = std::fs::read_to_string(&extraction_path)?;
                prompts.extraction = toml::from_str(&content)?;
            }

            let verification_path = custom_path.join("verification.toml");
            if verification_path.exists() {
                let content = std::fs::read_to_string(&verification_path)?;
                prompts.verification = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.extraction.system.contains("atomic facts"));
        assert!(prompts.verification.system.contains("fact-checker"));
    }

    #[test]
    fn test_custom_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extraction.toml"),
            r#"system = "Custom extraction prompt""#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.extraction.system, "Custom extraction prompt");
        // Verification keeps its default.
        assert!(prompts.verification.system.contains("fact-checker"));
    }
}
