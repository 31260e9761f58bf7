//! OpenAI-backed claim extraction.

use super::ClaimExtractor;
use crate::config::Prompts;
use crate::error::{GranskaError, Result};
use crate::openai::create_client_with_key;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Claim extractor backed by an OpenAI chat model.
pub struct OpenAiExtractor {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: &str, model: &str, prompts: &Prompts) -> Self {
        Self {
            client: create_client_with_key(api_key),
            model: model.to_string(),
            system_prompt: prompts.extraction.system.clone(),
        }
    }
}

#[async_trait]
impl ClaimExtractor for OpenAiExtractor {
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    async fn extract(&self, transcript: &str) -> Result<Vec<String>> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| GranskaError::Extraction(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(transcript.to_string())
                .build()
                .map_err(|e| GranskaError::Extraction(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .seed(42)
            .build()
            .map_err(|e| GranskaError::Extraction(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GranskaError::OpenAI(format!("Extraction request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| {
                GranskaError::Extraction("Empty response from extraction model".to_string())
            })?;

        let claims = parse_claim_list(content)?;
        debug!("Extracted {} claims", claims.len());
        Ok(claims)
    }
}

/// Parse the extractor's output: a JSON array of single-key objects mapping
/// claim numbers to claim texts.
///
/// The format is brittle free text; malformed output fails the whole task
/// and is not retried.
pub fn parse_claim_list(raw: &str) -> Result<Vec<String>> {
    let cleaned = strip_code_fences(raw);

    let entries: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(cleaned.trim()).map_err(|e| {
            GranskaError::Extraction(format!("Extractor output is not a claim list: {}", e))
        })?;

    let mut claims = Vec::with_capacity(entries.len());
    for entry in &entries {
        if entry.len() != 1 {
            return Err(GranskaError::Extraction(format!(
                "Expected single-key claim entries, got {} keys",
                entry.len()
            )));
        }
        let text = entry
            .values()
            .next()
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                GranskaError::Extraction("Claim entry value is not a string".to_string())
            })?;
        claims.push(text.trim().to_string());
    }

    Ok(claims)
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("fence regex is valid")
    });

    match fence.captures(raw) {
        Some(caps) => caps.get(1).map_or(raw, |m| m.as_str()),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claim_list() {
        let raw = r#"[ {"1": "She currently stars in Love and Destiny."}, {"2": "Love and Destiny premiered in 2019."} ]"#;
        let claims = parse_claim_list(raw).unwrap();
        assert_eq!(
            claims,
            vec![
                "She currently stars in Love and Destiny.",
                "Love and Destiny premiered in 2019."
            ]
        );
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let raw = "```json\n[ {\"1\": \"A fact.\"} ]\n```";
        let claims = parse_claim_list(raw).unwrap();
        assert_eq!(claims, vec!["A fact."]);
    }

    #[test]
    fn test_parse_trims_claim_text() {
        let raw = r#"[ {"1": "  padded claim  "} ]"#;
        assert_eq!(parse_claim_list(raw).unwrap(), vec!["padded claim"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_claim_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_output_is_hard_failure() {
        assert!(parse_claim_list("I could not find any claims.").is_err());
        assert!(parse_claim_list(r#"[ {"1": "a", "2": "b"} ]"#).is_err());
        assert!(parse_claim_list(r#"[ {"1": 42} ]"#).is_err());
    }
}
