//! Perplexity Sonar claim verification.
//!
//! Speaks the OpenAI-compatible chat completions wire format directly over
//! reqwest: the response carries `search_results` metadata (the evidence
//! URLs) that typed OpenAI clients do not model.

use super::{ClaimVerifier, ContextWindow, Verdict, Verification};
use crate::config::Prompts;
use crate::error::{GranskaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Search-augmented claim verifier backed by Perplexity's Sonar models.
pub struct SonarVerifier {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    system_prompt: String,
    search_context_size: String,
}

impl SonarVerifier {
    pub fn new(
        api_key: &str,
        model: &str,
        api_base: &str,
        search_context_size: &str,
        prompts: &Prompts,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            system_prompt: prompts.verification.system.clone(),
            search_context_size: search_context_size.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    web_search_options: WebSearchOptions<'a>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct WebSearchOptions<'a> {
    search_context_size: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    search_results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct SearchResult {
    url: String,
}

/// Build the user prompt: the claim, preceded by recently verified claims
/// when any exist. An empty window is omitted entirely.
fn build_user_prompt(claim: &str, context: &ContextWindow) -> String {
    let fact = format!("Fact to check: {}", claim);
    if context.is_empty() {
        fact
    } else {
        format!("Previous claims: {}\n\n{}", context.render(), fact)
    }
}

#[async_trait]
impl ClaimVerifier for SonarVerifier {
    #[instrument(skip(self, context), fields(claim = %claim))]
    async fn verify(&self, claim: &str, context: &ContextWindow) -> Result<Verification> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: self.system_prompt.clone(),
                },
                Message {
                    role: "user",
                    content: build_user_prompt(claim, context),
                },
            ],
            web_search_options: WebSearchOptions {
                search_context_size: &self.search_context_size,
            },
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GranskaError::Verification(format!("Verifier request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| {
                GranskaError::Verification(format!("Verifier returned error status: {}", e))
            })?
            .json::<ChatResponse>()
            .await
            .map_err(|e| {
                GranskaError::VerifierFormat(format!("Verifier response is not valid JSON: {}", e))
            })?;

        let label = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                GranskaError::VerifierFormat("Verifier response has no content".to_string())
            })?;

        let verdict = Verdict::parse(&label).ok_or_else(|| {
            GranskaError::VerifierFormat(format!("Unrecognized verdict label: '{}'", label.trim()))
        })?;

        let evidence = response.search_results.into_iter().map(|r| r.url).collect();
        debug!(%verdict, "Claim verified");

        Ok(Verification { verdict, evidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_omits_empty_window() {
        let window = ContextWindow::new(5);
        assert_eq!(
            build_user_prompt("The sky is blue.", &window),
            "Fact to check: The sky is blue."
        );
    }

    #[test]
    fn test_prompt_includes_window_contents() {
        let mut window = ContextWindow::new(5);
        window.push("Earlier claim one.");
        window.push("Earlier claim two.");

        let prompt = build_user_prompt("The sky is blue.", &window);
        assert_eq!(
            prompt,
            "Previous claims: ['Earlier claim one.', 'Earlier claim two.']\n\nFact to check: The sky is blue."
        );
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "true"}}],
            "search_results": [
                {"title": "Some page", "url": "https://www.reuters.com/a", "date": "2025-01-01"},
                {"title": "Other page", "url": "https://example.com/b"}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("true"));
        let urls: Vec<&str> = response.search_results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://www.reuters.com/a", "https://example.com/b"]);
    }
}
