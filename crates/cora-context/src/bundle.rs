// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assembled context for one turn. Ephemeral, never persisted.

use cora_core::types::{
    AssistantMode, CalendarEvent, ConversationMessage, FinanceSnapshot, Goal, Task, UserProfile,
};
use cora_memory::ScoredMemory;
use cora_patterns::LearnedPattern;

/// Everything the prompt renderer needs for one message.
///
/// Every slice is optional in practice: a failed sub-fetch leaves its slice
/// empty and the rest intact.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    pub profile: Option<UserProfile>,
    pub mode: Option<AssistantMode>,
    pub memories: Vec<ScoredMemory>,
    pub patterns: Vec<LearnedPattern>,
    pub tasks: Vec<Task>,
    pub events: Vec<CalendarEvent>,
    pub goals: Vec<Goal>,
    pub finance: Option<FinanceSnapshot>,
    /// Dialogue tail of the current session, oldest first.
    pub recent_messages: Vec<ConversationMessage>,
}
