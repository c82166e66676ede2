// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cora personal-assistant backend.
//!
//! This crate provides the shared error type, canonical domain/row types,
//! and the collaborator traits used throughout the Cora workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CoraError;
pub use traits::TextProvider;
pub use types::{
    ActionDirective, AssistantMode, CalendarEvent, ConversationMessage, ExecutedAction,
    FinanceEntry, FinanceSnapshot, Goal, InboxItem, MessageRole, Reminder, Session, Task,
    UserProfile,
};
