// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Non-streaming only: the engine makes one generation call per turn and
//! every call site carries a local fallback, so failures surface as plain
//! provider errors with no retry here.

use std::time::Duration;

use async_trait::async_trait;
use cora_core::{CoraError, TextProvider};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatMessage, MessageRequest, MessageResponse};

const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic-backed implementation of [`TextProvider`].
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Builds a provider with authentication headers baked into the client.
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self, CoraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| CoraError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CoraError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for tests against a local server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CoraError> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens,
            temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoraError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(parsed) => format!(
                    "API error {status}: {} ({})",
                    parsed.error.message, parsed.error.error_type
                ),
                Err(_) => format!("API error {status}"),
            };
            return Err(CoraError::provider(message));
        }

        let parsed: MessageResponse =
            response.json().await.map_err(|e| CoraError::Provider {
                message: format!("malformed API response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(
            model = %self.model,
            stop_reason = ?parsed.stop_reason,
            "generation call completed"
        );
        Ok(parsed.text())
    }
}
