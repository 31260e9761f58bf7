//! OpenAI client configuration with sensible defaults.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client using the ambient `OPENAI_API_KEY`.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_config(OpenAIConfig::default())
}

/// Create an OpenAI client with an explicit API key.
///
/// Extraction credentials arrive with each submission rather than from the
/// process environment.
pub fn create_client_with_key(api_key: &str) -> Client<OpenAIConfig> {
    create_client_with_config(OpenAIConfig::default().with_api_key(api_key))
}

fn create_client_with_config(config: OpenAIConfig) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(config).with_http_client(http_client)
}
