// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical row and domain types shared across the Cora workspace.
//!
//! Storage query modules, the context aggregator, and the engine all speak
//! these types. Timestamps are RFC3339 TEXT columns, matching the SQLite
//! schema.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who authored a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A bounded dialogue window for one user.
///
/// Invariant: at most one active (non-terminal) session per user. Closed
/// sessions keep their rows with `is_active = false`, `ended_at` set, and a
/// best-effort summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub mode_id: Option<String>,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub is_active: bool,
    pub message_count: i64,
    pub summary: Option<String>,
}

impl Session {
    /// Builds a fresh active session starting now.
    pub fn new(user_id: impl Into<String>, mode_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            mode_id,
            started_at: chrono::Utc::now().to_rfc3339(),
            ended_at: None,
            is_active: true,
            message_count: 0,
            summary: None,
        }
    }
}

/// One turn of dialogue, append-only. Ordering by `created_at` is the
/// canonical dialogue order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Channel tag supplied by the upstream caller (e.g. "cli", "api").
    pub source: String,
    pub intent: Option<String>,
    /// JSON-encoded list of executed actions, when the turn had any.
    pub actions_taken: Option<String>,
    pub created_at: String,
}

impl ConversationMessage {
    /// Builds a message with a fresh id and the current time.
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            user_id: user_id.into(),
            role,
            content: content.into(),
            source: source.into(),
            intent: None,
            actions_taken: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A machine-readable side-effect request parsed out of generated text.
///
/// Ephemeral: zero or more per reply, consumed immediately by the action
/// executor and never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDirective {
    /// Lower-cased open identifier ("task", "inbox", "reminder", ...).
    pub kind: String,
    /// Free text payload, trimmed.
    pub details: String,
}

/// A directive that was successfully applied, with the id of the record it
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedAction {
    pub kind: String,
    pub details: String,
    pub created_id: String,
}

// --- Domain rows read by the context aggregator and written by the executor ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub processed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub content: String,
    /// No scheduling is wired from the core; reminders sit as pending
    /// placeholders until an outer scheduler picks them up.
    pub remind_at: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub starts_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: String,
    pub progress: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub id: String,
    pub user_id: String,
    /// "income" or "expense".
    pub kind: String,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub occurred_at: String,
}

/// Month-to-date totals, assembled by a single aggregate query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceSnapshot {
    pub income_cents: i64,
    pub expense_cents: i64,
}

impl FinanceSnapshot {
    pub fn balance_cents(&self) -> i64 {
        self.income_cents - self.expense_cents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub timezone: Option<String>,
    pub bio: Option<String>,
}

/// An assistant persona/mode a user can activate (e.g. "foco", "coach").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMode {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn message_role_round_trips() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            assert_eq!(MessageRole::from_str(&s).unwrap(), role);
        }
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn finance_snapshot_balance() {
        let snap = FinanceSnapshot {
            income_cents: 500_000,
            expense_cents: 320_050,
        };
        assert_eq!(snap.balance_cents(), 179_950);
        assert_eq!(FinanceSnapshot::default().balance_cents(), 0);
    }

    #[test]
    fn action_directive_serialization() {
        let d = ActionDirective {
            kind: "task".into(),
            details: "Terminar o relatório".into(),
        };
        let json = serde_json::to_string(&d).unwrap();
        let parsed: ActionDirective = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }
}
