// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term user memories: storage, clamped importance, and keyword-plus-
//! importance retrieval ranking.

pub mod retriever;
pub mod store;
pub mod types;

pub use retriever::MemoryRetriever;
pub use store::MemoryStore;
pub use types::{Memory, MemoryCategory, ScoredMemory, clamp_importance};
