// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory row type, category enum, and importance clamping.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Importance bounds. Out-of-range values are corrected by clamping, never
/// rejected.
pub const MIN_IMPORTANCE: i64 = 1;
pub const MAX_IMPORTANCE: i64 = 10;

/// What kind of remembered fact this is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Preference,
    Fact,
    Pattern,
    Relationship,
    Goal,
    Context,
    Feedback,
}

/// A discrete remembered fact about a user.
///
/// Mutated by retrieval (access bookkeeping) and by explicit update or
/// deactivation; never hard-deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub category: MemoryCategory,
    pub content: String,
    /// Always within `[MIN_IMPORTANCE, MAX_IMPORTANCE]` once stored.
    pub importance: i64,
    pub is_active: bool,
    pub access_count: i64,
    pub last_accessed_at: Option<String>,
    pub created_at: String,
    /// Back-references to the originating turn, when known.
    pub session_id: Option<String>,
    pub message_id: Option<String>,
}

impl Memory {
    /// Builds a new memory with a fresh id and clamped importance.
    pub fn new(
        user_id: impl Into<String>,
        category: MemoryCategory,
        content: impl Into<String>,
        importance: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            category,
            content: content.into(),
            importance: clamp_importance(importance),
            is_active: true,
            access_count: 0,
            last_accessed_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            session_id: None,
            message_id: None,
        }
    }
}

/// Clamp importance into `[1, 10]`.
pub fn clamp_importance(importance: i64) -> i64 {
    importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE)
}

/// A memory with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub memory: Memory,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn importance_is_clamped() {
        assert_eq!(clamp_importance(15), 10);
        assert_eq!(clamp_importance(-3), 1);
        assert_eq!(clamp_importance(0), 1);
        assert_eq!(clamp_importance(12), 10);
        assert_eq!(clamp_importance(7), 7);
    }

    #[test]
    fn new_memory_clamps_on_construction() {
        let m = Memory::new("user-1", MemoryCategory::Preference, "gosta de café", 0);
        assert_eq!(m.importance, 1);
        let m = Memory::new("user-1", MemoryCategory::Fact, "mora em Recife", 12);
        assert_eq!(m.importance, 10);
    }

    #[test]
    fn category_round_trips() {
        for cat in [
            MemoryCategory::Preference,
            MemoryCategory::Fact,
            MemoryCategory::Pattern,
            MemoryCategory::Relationship,
            MemoryCategory::Goal,
            MemoryCategory::Context,
            MemoryCategory::Feedback,
        ] {
            let s = cat.to_string();
            assert_eq!(MemoryCategory::from_str(&s).unwrap(), cat);
        }
    }
}
