//! Claim extraction and verification for Granska.
//!
//! Defines the data model for fact-check reports and the trait seams for the
//! two external language-model capabilities: the claim extractor and the
//! search-augmented claim verifier.

mod extractor;
mod verifier;

pub use extractor::{parse_claim_list, OpenAiExtractor};
pub use verifier::SonarVerifier;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One atomic factual statement extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// 1-based position in extraction order.
    pub num: usize,
    /// The claim text.
    #[serde(rename = "extracted_claim")]
    pub text: String,
}

/// Fact-check label assigned to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "misleading/partially true")]
    Misleading,
    #[serde(rename = "unverifiable")]
    Unverifiable,
}

impl Verdict {
    /// Parse a verifier label, tolerating case, surrounding quotes, and
    /// trailing punctuation. Returns None for anything unrecognized.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '.')
            .trim()
            .to_lowercase();

        match normalized.as_str() {
            "true" => Some(Verdict::True),
            "false" => Some(Verdict::False),
            "misleading" | "partially true" | "misleading/partially true" => {
                Some(Verdict::Misleading)
            }
            "unverifiable" => Some(Verdict::Unverifiable),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::True => write!(f, "true"),
            Verdict::False => write!(f, "false"),
            Verdict::Misleading => write!(f, "misleading/partially true"),
            Verdict::Unverifiable => write!(f, "unverifiable"),
        }
    }
}

/// Outcome of one successful verifier call.
#[derive(Debug, Clone)]
pub struct Verification {
    pub verdict: Verdict,
    /// Evidence URLs from the verifier's web search, in response order.
    pub evidence: Vec<String>,
}

/// One fact-checked claim with its verdict and annotated sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckRecord {
    #[serde(flatten)]
    pub claim: Claim,
    #[serde(rename = "label")]
    pub verdict: Verdict,
    pub sources: Vec<String>,
}

/// Bounded FIFO of recently verified claim texts.
///
/// Supplied to the verifier as disambiguating context for the next claim:
/// claim *i* can reference claims *1..i-1* but never future ones. The fixed
/// capacity bounds prompt size and limits unrelated-topic pollution.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    claims: VecDeque<String>,
    capacity: usize,
}

impl ContextWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            claims: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a claim text, evicting the oldest when full.
    pub fn push(&mut self, claim: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.claims.len() == self.capacity {
            self.claims.pop_front();
        }
        self.claims.push_back(claim.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// The window contents, oldest first.
    pub fn claims(&self) -> impl Iterator<Item = &str> {
        self.claims.iter().map(String::as_str)
    }

    /// Render the window for a verification prompt, oldest first.
    pub fn render(&self) -> String {
        let quoted: Vec<String> = self.claims.iter().map(|c| format!("'{}'", c)).collect();
        format!("[{}]", quoted.join(", "))
    }
}

/// Extracts an ordered list of atomic claims from a transcript.
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    async fn extract(&self, transcript: &str) -> Result<Vec<String>>;
}

/// Verifies one claim against web evidence, given recent claims as context.
#[async_trait]
pub trait ClaimVerifier: Send + Sync {
    async fn verify(&self, claim: &str, context: &ContextWindow) -> Result<Verification>;
}
