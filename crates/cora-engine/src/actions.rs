// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directive dispatch with partial-success batch semantics.
//!
//! Each directive executes independently: a failing or unknown entry is
//! logged and skipped, the rest still apply. Only the applied subset is
//! returned, each with its created id.

use cora_core::types::{ActionDirective, ExecutedAction, InboxItem, Reminder, Task};
use cora_memory::{Memory, MemoryCategory, MemoryStore};
use cora_storage::database::now_rfc3339;
use cora_storage::{Database, queries};
use tracing::{info, warn};

/// Result of applying one reply's directives.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub actions: Vec<ExecutedAction>,
    /// Ids of memories created via the `memoria` directive.
    pub created_memories: Vec<String>,
}

/// Applies parsed directives as durable state changes.
pub struct ActionExecutor {
    db: Database,
    memories: MemoryStore,
}

impl ActionExecutor {
    pub fn new(db: Database, memories: MemoryStore) -> Self {
        Self { db, memories }
    }

    /// Execute a batch of directives for one turn.
    pub async fn execute(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        directives: &[ActionDirective],
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for directive in directives {
            match self.dispatch(user_id, session_id, directive).await {
                Ok(Some(executed)) => {
                    info!(
                        user_id,
                        kind = %executed.kind,
                        created_id = %executed.created_id,
                        "directive applied"
                    );
                    if executed.kind == "memoria" {
                        report.created_memories.push(executed.created_id.clone());
                    }
                    report.actions.push(executed);
                }
                Ok(None) => {
                    warn!(user_id, kind = %directive.kind, "unknown directive type, skipped");
                }
                Err(e) => {
                    warn!(user_id, kind = %directive.kind, error = %e, "directive failed, skipped");
                }
            }
        }
        report
    }

    async fn dispatch(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        directive: &ActionDirective,
    ) -> Result<Option<ExecutedAction>, cora_core::CoraError> {
        let executed = match directive.kind.as_str() {
            "task" => {
                let task = Task {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    title: directive.details.clone(),
                    status: "pending".to_string(),
                    priority: "medium".to_string(),
                    due_date: None,
                    created_at: now_rfc3339(),
                };
                queries::insert_task(&self.db, &task).await?;
                ExecutedAction {
                    kind: "task".to_string(),
                    details: directive.details.clone(),
                    created_id: task.id,
                }
            }
            "inbox" => {
                let item = InboxItem {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    content: directive.details.clone(),
                    processed: false,
                    created_at: now_rfc3339(),
                };
                queries::insert_inbox_item(&self.db, &item).await?;
                ExecutedAction {
                    kind: "inbox".to_string(),
                    details: directive.details.clone(),
                    created_id: item.id,
                }
            }
            // Pending placeholder only; no scheduling is wired from here.
            "reminder" | "lembrete" => {
                let reminder = Reminder {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    content: directive.details.clone(),
                    remind_at: None,
                    status: "pending".to_string(),
                    created_at: now_rfc3339(),
                };
                queries::insert_reminder(&self.db, &reminder).await?;
                ExecutedAction {
                    kind: "reminder".to_string(),
                    details: directive.details.clone(),
                    created_id: reminder.id,
                }
            }
            "memoria" | "memória" => {
                let mut memory =
                    Memory::new(user_id, MemoryCategory::Context, &directive.details, 5);
                memory.session_id = session_id.map(str::to_string);
                self.memories.save(&memory).await?;
                ExecutedAction {
                    kind: "memoria".to_string(),
                    details: directive.details.clone(),
                    created_id: memory.id,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(executed))
    }
}
