//! Fact-check pipeline orchestrator for Granska.
//!
//! Drives extracted claims through the verifier strictly in order,
//! accumulating a bounded window of prior claims as context and annotating
//! evidence URLs against the trusted-source registry.

use crate::error::{GranskaError, Result};
use crate::factcheck::{
    Claim, ClaimExtractor, ClaimVerifier, ContextWindow, FactCheckRecord, Verification,
};
use crate::task::CancelFlag;
use crate::trusted::TrustedSources;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Retry policy for malformed verifier output.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per claim before the task fails.
    pub max_attempts: usize,
    /// Base backoff between attempts, doubled after each failure.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

/// The fact-check orchestrator.
///
/// Claims are verified one at a time, never concurrently: each claim's
/// prompt depends on the context window updated by the previous claim, so
/// context accumulates causally as the narrative unfolds.
pub struct Orchestrator {
    extractor: Arc<dyn ClaimExtractor>,
    verifier: Arc<dyn ClaimVerifier>,
    trusted: Arc<TrustedSources>,
    window_capacity: usize,
    retry: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        extractor: Arc<dyn ClaimExtractor>,
        verifier: Arc<dyn ClaimVerifier>,
        trusted: Arc<TrustedSources>,
    ) -> Self {
        Self {
            extractor,
            verifier,
            trusted,
            window_capacity: 5,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the full fact-check pass over a transcript.
    ///
    /// Records come back in extraction order with contiguous 1-based indices.
    #[instrument(skip_all, fields(transcript_len = transcript.len()))]
    pub async fn run(&self, transcript: &str, cancel: &CancelFlag) -> Result<Vec<FactCheckRecord>> {
        // An empty transcript is valid input and yields zero claims.
        let claims = if transcript.trim().is_empty() {
            Vec::new()
        } else {
            self.extractor.extract(transcript).await?
        };
        info!("Extracted {} claims", claims.len());

        let mut window = ContextWindow::new(self.window_capacity);
        let mut records = Vec::with_capacity(claims.len());

        for (idx, text) in claims.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(GranskaError::Cancelled);
            }

            let verification = self.verify_with_retry(&text, &window).await?;

            let sources = verification
                .evidence
                .iter()
                .map(|url| self.trusted.annotate(url))
                .collect();

            window.push(&text);
            records.push(FactCheckRecord {
                claim: Claim { num: idx + 1, text },
                verdict: verification.verdict,
                sources,
            });
        }

        Ok(records)
    }

    /// Verify one claim, retrying malformed verifier output with exponential
    /// backoff up to the configured attempt budget. Transport and API errors
    /// are not retried.
    async fn verify_with_retry(
        &self,
        claim: &str,
        window: &ContextWindow,
    ) -> Result<Verification> {
        let mut backoff = self.retry.backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.retry.max_attempts {
            match self.verifier.verify(claim, window).await {
                Ok(verification) => return Ok(verification),
                Err(GranskaError::VerifierFormat(msg)) => {
                    warn!(attempt, "Malformed verifier output for claim '{}': {}", claim, msg);
                    last_error = msg;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(GranskaError::Verification(format!(
            "Verifier returned malformed output for {} consecutive attempts: {}",
            self.retry.max_attempts, last_error
        )))
    }
}
