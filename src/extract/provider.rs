//! Text generation provider
//!
//! The extractor talks to a model through the `TextGenerator` trait so the
//! HTTP client can be swapped for a stub in tests. The production
//! implementation calls the Anthropic Messages API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token budget for an extraction response. The reply is a single small
/// JSON object, so this stays deliberately low.
const MAX_TOKENS: u32 = 200;

/// Errors from a text generation request
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Request timed out")]
    Timeout,

    #[error("Unable to connect to the model provider")]
    Connect,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

// =============================================================================
// Anthropic Messages API client
// =============================================================================

/// Message response from the API; only the text content is of interest.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new client.
    ///
    /// The base URL is configurable so tests and staging environments can
    /// point at a local stand-in for the API.
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("Anthropic API key cannot be empty");
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn map_request_error(error: reqwest::Error) -> GenerateError {
        if error.is_timeout() {
            GenerateError::Timeout
        } else if error.is_connect() {
            GenerateError::Connect
        } else {
            GenerateError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status(status.as_u16()));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Malformed(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| GenerateError::Malformed("no text content in response".to_string()))
    }
}
