// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `cora-core::types` for use across
//! component boundaries. This module re-exports them for convenience within
//! the storage crate.

pub use cora_core::types::{
    AssistantMode, CalendarEvent, ConversationMessage, FinanceEntry, FinanceSnapshot, Goal,
    InboxItem, MessageRole, Reminder, Session, Task, UserProfile,
};
