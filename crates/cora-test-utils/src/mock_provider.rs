// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cora_core::{CoraError, TextProvider};

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a fixed
/// default text is returned. In failing mode every call errors.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    failing: bool,
}

impl MockProvider {
    /// Create a mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            failing: false,
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            failing: false,
        }
    }

    /// Create a mock provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            failing: true,
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, CoraError> {
        if self.failing {
            return Err(CoraError::provider("mock provider configured to fail"));
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "resposta simulada".to_string()))
    }
}
