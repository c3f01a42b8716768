// Claude API client for single-shot (non-streaming) completions.
//
// Sends a message to the Anthropic Messages API and returns the text of the
// first text content block. Extraction treats the model as an opaque
// function: text in, text out; everything else is error handling.

use anyhow::{anyhow, Context};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key and model identifier,
    /// pointed at the public Anthropic endpoint.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, ANTHROPIC_API_URL.to_string())
    }

    /// Create a client against a custom base URL (local gateways, tests).
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Send one message and return the model's text reply.
    pub async fn complete(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            return Err(anyhow!("API key not configured"));
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("failed to reach the messages API")?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .context("failed to read the messages API response")?;

        if !status.is_success() {
            let detail = payload
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(anyhow!("API returned status {status}: {detail}"));
        }

        debug!(?status, "messages API call completed");

        parse_message_text(&payload)
            .ok_or_else(|| anyhow!("messages API response contained no text content"))
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active Claude client or disabled.
pub enum LlmClient {
    /// Claude API is configured and ready.
    Active(ClaudeClient),
    /// LLM functionality is disabled (no API key configured).
    Disabled,
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    ///
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// returns `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => {
                let model = config.llm.model.clone();
                LlmClient::Active(ClaudeClient::new(key.clone(), model))
            }
            _ => LlmClient::Disabled,
        }
    }

    /// Complete a message, delegating to the inner `ClaudeClient` or failing
    /// immediately when disabled.
    pub async fn complete(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        match self {
            LlmClient::Active(client) => client.complete(system, user_content, max_tokens).await,
            LlmClient::Disabled => Err(anyhow!("LLM not configured")),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers
// ---------------------------------------------------------------------------

/// Extract the first text content block from a messages API response.
///
/// Expected shape: `{ "content": [ { "type": "text", "text": "..." } ] }`
pub(crate) fn parse_message_text(payload: &Value) -> Option<String> {
    let blocks = payload.get("content")?.as_array()?;
    for block in blocks {
        if block.get("type").and_then(Value::as_str) == Some("text") {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
