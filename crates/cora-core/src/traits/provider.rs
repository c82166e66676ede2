// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation collaborator trait.

use async_trait::async_trait;

use crate::error::CoraError;

/// Seam for the text-generation collaborator.
///
/// The provider is unreliable by design assumption: implementations may fail
/// at any call, and every call site carries a local fallback. The core never
/// retries a failed call.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Human-readable name of this provider instance.
    fn name(&self) -> &str;

    /// Generates text for the given prompt.
    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CoraError>;
}
