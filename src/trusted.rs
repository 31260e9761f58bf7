//! Trusted-source registry for evidence annotation.
//!
//! Loaded once at process start from a CSV of domain/URL strings with a
//! reliability label on a 1-6 scale; only high-trust entries are retained.
//! Injected where needed so tests can construct their own entry sets.

use crate::error::{GranskaError, Result};
use std::path::Path;
use tracing::{info, warn};

/// Marker prepended to evidence URLs that come from trusted domains.
pub const TRUST_MARKER: &str = "* ";

/// Minimum reliability label for an entry to be retained.
pub const DEFAULT_TRUST_THRESHOLD: u8 = 5;

/// Registry of high-reliability domains.
#[derive(Debug, Clone, Default)]
pub struct TrustedSources {
    entries: Vec<String>,
}

impl TrustedSources {
    /// Create a registry from an explicit entry list.
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Load a registry from a CSV of `url,label` rows, keeping only entries
    /// with a label at or above `threshold`.
    pub fn load(path: &Path, threshold: u8) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GranskaError::Config(format!(
                "Cannot read trusted sources file {}: {}",
                path.display(),
                e
            ))
        })?;

        let registry = Self::parse(&content, threshold);
        info!(
            "Loaded {} trusted source entries from {}",
            registry.entries.len(),
            path.display()
        );
        Ok(registry)
    }

    fn parse(content: &str, threshold: u8) -> Self {
        let mut entries = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((url, label)) = line.rsplit_once(',') else {
                warn!("Skipping malformed trusted sources row {}", line_no + 1);
                continue;
            };

            match label.trim().parse::<u8>() {
                Ok(l) if l >= threshold => entries.push(url.trim().to_string()),
                Ok(_) => {}
                // Non-numeric label: a header row on line 1, malformed otherwise.
                Err(_) if line_no == 0 => {}
                Err(_) => warn!("Skipping malformed trusted sources row {}", line_no + 1),
            }
        }

        Self { entries }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any retained entry appears as a substring of the candidate URL.
    pub fn is_trusted(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| url.contains(entry.as_str()))
    }

    /// Prefix the URL with the trust marker when it matches the registry.
    /// The first matching entry wins; the marker is applied at most once.
    pub fn annotate(&self, url: &str) -> String {
        if self.is_trusted(url) {
            format!("{}{}", TRUST_MARKER, url)
        } else {
            url.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TrustedSources {
        TrustedSources::new(vec!["reuters.com".to_string(), "apnews.com".to_string()])
    }

    #[test]
    fn test_parse_applies_threshold() {
        let csv = "url,label\nreuters.com,6\nexample-blog.net,2\napnews.com,5\n";
        let registry = TrustedSources::parse(csv, DEFAULT_TRUST_THRESHOLD);

        assert_eq!(registry.len(), 2);
        assert!(registry.is_trusted("https://www.reuters.com/world/story"));
        assert!(!registry.is_trusted("https://example-blog.net/post"));
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let csv = "reuters.com,6\nnot a row\napnews.com,notanumber\n";
        let registry = TrustedSources::parse(csv, DEFAULT_TRUST_THRESHOLD);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_substring_membership() {
        let registry = registry();
        assert!(registry.is_trusted("https://www.reuters.com/article/xyz"));
        assert!(!registry.is_trusted("https://unknown.example/article"));
    }

    #[test]
    fn test_annotate_applies_marker_once() {
        let registry = registry();
        // reuters.com is the first matching entry; apnews.com is never consulted.
        assert_eq!(
            registry.annotate("https://www.reuters.com/apnews.com-story"),
            "* https://www.reuters.com/apnews.com-story"
        );
        assert_eq!(
            registry.annotate("https://unknown.example/article"),
            "https://unknown.example/article"
        );
    }
}
