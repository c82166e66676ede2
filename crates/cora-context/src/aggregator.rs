// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-source context assembly.
//!
//! Each slice comes from its own sub-fetch; a failing slice degrades to
//! empty with a warning and never aborts the whole call. Partial context
//! beats no context.

use chrono::{Duration, Utc};
use cora_memory::MemoryRetriever;
use cora_patterns::PatternStore;
use cora_storage::{Database, queries};
use tracing::warn;

use crate::bundle::ContextBundle;

/// Tuning knobs for context assembly, mapped from configuration.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Upper bound on ranked memories per turn.
    pub max_memories: usize,
    /// Dialogue-tail length in messages.
    pub recent_messages: usize,
    /// How many days ahead the event window reaches.
    pub event_window_days: i64,
    /// Confidence floor for patterns included in context.
    pub min_pattern_confidence: f64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_memories: 10,
            recent_messages: 5,
            event_window_days: 7,
            min_pattern_confidence: 0.5,
        }
    }
}

/// Assembles a [`ContextBundle`] from every context source.
pub struct ContextAggregator {
    db: Database,
    retriever: MemoryRetriever,
    patterns: PatternStore,
    options: ContextOptions,
}

impl ContextAggregator {
    pub fn new(
        db: Database,
        retriever: MemoryRetriever,
        patterns: PatternStore,
        options: ContextOptions,
    ) -> Self {
        Self {
            db,
            retriever,
            patterns,
            options,
        }
    }

    /// Context for one inbound message.
    ///
    /// Sub-fetches share no mutable state and run concurrently. Infallible
    /// by contract: every slice failure is contained here.
    pub async fn get_context_for_message(
        &self,
        user_id: &str,
        message: &str,
        session_id: Option<&str>,
    ) -> ContextBundle {
        let now = Utc::now();
        let window_end = now + Duration::days(self.options.event_window_days);
        let month = now.format("%Y-%m").to_string();

        let profile = async {
            queries::get_profile(&self.db, user_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "profile fetch failed");
                    None
                })
        };
        let mode = async {
            queries::get_active_mode(&self.db, user_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "mode fetch failed");
                    None
                })
        };
        let memories = async {
            self.retriever
                .search(user_id, message, self.options.max_memories)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "memory search failed");
                    Vec::new()
                })
        };
        let patterns = async {
            self.patterns
                .list_active(user_id, self.options.min_pattern_confidence)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "pattern fetch failed");
                    Vec::new()
                })
        };
        let tasks = async {
            queries::list_pending_tasks(&self.db, user_id, self.options.max_memories)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "task fetch failed");
                    Vec::new()
                })
        };
        let events = async {
            queries::list_events_between(
                &self.db,
                user_id,
                &now.to_rfc3339(),
                &window_end.to_rfc3339(),
                self.options.max_memories,
            )
            .await
            .unwrap_or_else(|e| {
                warn!(user_id, error = %e, "event fetch failed");
                Vec::new()
            })
        };
        let goals = async {
            queries::list_active_goals(&self.db, user_id, self.options.max_memories)
                .await
                .unwrap_or_else(|e| {
                    warn!(user_id, error = %e, "goal fetch failed");
                    Vec::new()
                })
        };
        let finance = async {
            match queries::finance_month_snapshot(&self.db, user_id, &month).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(user_id, error = %e, "finance fetch failed");
                    None
                }
            }
        };
        let recent_messages = async {
            match session_id {
                Some(session_id) => {
                    queries::get_recent_messages(&self.db, session_id, self.options.recent_messages)
                        .await
                        .unwrap_or_else(|e| {
                            warn!(user_id, error = %e, "dialogue tail fetch failed");
                            Vec::new()
                        })
                }
                None => Vec::new(),
            }
        };

        let (profile, mode, memories, patterns, tasks, events, goals, finance, recent_messages) = tokio::join!(
            profile,
            mode,
            memories,
            patterns,
            tasks,
            events,
            goals,
            finance,
            recent_messages
        );

        ContextBundle {
            profile,
            mode,
            memories,
            patterns,
            tasks,
            events,
            goals,
            finance,
            recent_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cora_core::types::{MessageRole, Session, Task, UserProfile};
    use cora_memory::{Memory, MemoryCategory, MemoryStore};
    use tempfile::tempdir;

    async fn setup() -> (ContextAggregator, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let aggregator = ContextAggregator::new(
            db.clone(),
            MemoryRetriever::new(MemoryStore::new(db.clone())),
            PatternStore::new(db.clone()),
            ContextOptions::default(),
        );
        (aggregator, db, dir)
    }

    #[tokio::test]
    async fn empty_database_yields_empty_bundle() {
        let (aggregator, _db, _dir) = setup().await;
        let bundle = aggregator
            .get_context_for_message("user-1", "bom dia", None)
            .await;
        assert!(bundle.profile.is_none());
        assert!(bundle.memories.is_empty());
        assert!(bundle.tasks.is_empty());
        assert!(bundle.recent_messages.is_empty());
    }

    #[tokio::test]
    async fn populated_slices_arrive_together() {
        let (aggregator, db, _dir) = setup().await;

        queries::upsert_profile(
            &db,
            &UserProfile {
                user_id: "user-1".to_string(),
                display_name: "Ana".to_string(),
                timezone: None,
                bio: None,
            },
        )
        .await
        .unwrap();

        let store = MemoryStore::new(db.clone());
        store
            .save(&Memory::new(
                "user-1",
                MemoryCategory::Fact,
                "trabalha com vendas",
                6,
            ))
            .await
            .unwrap();

        queries::insert_task(
            &db,
            &Task {
                id: "task-1".to_string(),
                user_id: "user-1".to_string(),
                title: "Enviar proposta".to_string(),
                status: "pending".to_string(),
                priority: "medium".to_string(),
                due_date: None,
                created_at: cora_storage::now_rfc3339(),
            },
        )
        .await
        .unwrap();

        let bundle = aggregator
            .get_context_for_message("user-1", "como vão as vendas", None)
            .await;
        assert_eq!(bundle.profile.unwrap().display_name, "Ana");
        assert_eq!(bundle.memories.len(), 1);
        assert_eq!(bundle.tasks.len(), 1);
    }

    #[tokio::test]
    async fn dialogue_tail_follows_session() {
        let (aggregator, db, _dir) = setup().await;

        let session = Session::new("user-1", None);
        queries::create_session(&db, &session).await.unwrap();
        for i in 0..8 {
            let mut msg = cora_core::types::ConversationMessage::new(
                session.id.clone(),
                "user-1",
                MessageRole::User,
                format!("mensagem {i}"),
                "cli",
            );
            msg.created_at = format!("2026-03-02T08:{:02}:00+00:00", i);
            queries::insert_message(&db, &msg).await.unwrap();
        }

        let bundle = aggregator
            .get_context_for_message("user-1", "oi", Some(&session.id))
            .await;
        // Last five turns, oldest first.
        assert_eq!(bundle.recent_messages.len(), 5);
        assert_eq!(bundle.recent_messages[0].content, "mensagem 3");
        assert_eq!(bundle.recent_messages[4].content, "mensagem 7");
    }
}
