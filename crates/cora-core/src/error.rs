// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cora assistant backend.

use thiserror::Error;

/// The primary error type used across Cora collaborator seams and core operations.
#[derive(Debug, Error)]
pub enum CoraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence collaborator errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Text-generation collaborator errors (API failure, token limits, model not found).
    ///
    /// Call sites treat the generation collaborator as unreliable: every one
    /// of them has a local fallback and this variant never reaches the user.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoraError {
    /// Wraps any error into the `Storage` variant.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(source: E) -> Self {
        CoraError::Storage {
            source: Box::new(source),
        }
    }

    /// Builds a `Provider` error from a plain message.
    pub fn provider(message: impl Into<String>) -> Self {
        CoraError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
