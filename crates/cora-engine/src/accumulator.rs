// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-progress multi-part answers.
//!
//! Long answers arrive in parts keyed by `(user_id, question_id)`;
//! `finalize` is the terminal transition that joins and clears them.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// Collects answer parts until the caller finalizes the question.
#[derive(Default)]
pub struct AnswerAccumulator {
    parts: Mutex<HashMap<(String, String), Vec<String>>>,
}

impl AnswerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one part to a pending answer, creating it on first use.
    /// Returns how many parts the answer now has.
    pub async fn append(&self, user_id: &str, question_id: &str, part: &str) -> usize {
        let mut parts = self.parts.lock().await;
        let entry = parts
            .entry((user_id.to_string(), question_id.to_string()))
            .or_default();
        entry.push(part.to_string());
        entry.len()
    }

    /// Finalize a pending answer: joins its parts and removes the entry.
    /// `None` when nothing was accumulated under that key.
    pub async fn finalize(&self, user_id: &str, question_id: &str) -> Option<String> {
        self.parts
            .lock()
            .await
            .remove(&(user_id.to_string(), question_id.to_string()))
            .map(|parts| parts.join("\n"))
    }

    /// Pending answer count, for the status surface.
    pub async fn pending(&self) -> usize {
        self.parts.lock().await.len()
    }
}
