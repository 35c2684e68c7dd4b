//! Text-completion oracle abstraction and the Anthropic-backed implementation.
//!
//! The pipeline treats the oracle as an opaque, occasionally non-deterministic
//! text-in/text-out service with no structured error taxonomy beyond
//! "call failed". Tests substitute a scripted implementation.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Budget: `oracle.max_retries` extra attempts (default 1), backoff 1s, 2s, ...

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::OracleConfig;

/// The opaque text-completion collaborator.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Complete `prompt`, producing at most `max_output_tokens` of text.
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String>;
}

/// Oracle backed by the Anthropic Messages API.
///
/// Requires the `ANTHROPIC_API_KEY` environment variable. The request
/// timeout and retry budget come from `[oracle]` config; both oracle calls
/// in a pipeline run use the same client.
pub struct AnthropicOracle {
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl AnthropicOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            bail!("ANTHROPIC_API_KEY environment variable not set");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            client,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY not set"))?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_output_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", &api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_messages_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Oracle API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Oracle API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Oracle call failed after retries")))
    }
}

/// Extract the first text block from a Messages API response.
fn parse_messages_response(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid oracle response: missing content text"))?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages_response() {
        let json = serde_json::json!({
            "content": [{ "type": "text", "text": "  SELECT 1;  " }]
        });
        assert_eq!(parse_messages_response(&json).unwrap(), "SELECT 1;");
    }

    #[test]
    fn test_parse_rejects_empty_content() {
        let json = serde_json::json!({ "content": [] });
        assert!(parse_messages_response(&json).is_err());
    }
}
