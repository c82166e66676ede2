// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-session lifecycle.
//!
//! A user has at most one non-terminal session. The active session is reused
//! while it is younger than the configured age; an older one is closed with
//! a best-effort summary and a fresh session opens in its place.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use cora_core::types::Session;
use cora_core::{CoraError, TextProvider};
use cora_storage::database::now_rfc3339;
use cora_storage::{Database, queries};
use tracing::{debug, info, warn};

/// The session a turn runs under.
///
/// `id: None` is the degraded mode: persistence was unavailable, the turn
/// proceeds without durable continuity.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Option<String>,
}

impl SessionHandle {
    pub fn degraded() -> Self {
        Self { id: None }
    }
}

/// Owns session resolution, expiry, and closing summaries.
pub struct SessionManager {
    db: Database,
    provider: Arc<dyn TextProvider>,
    max_age_hours: i64,
    summary_min_messages: usize,
    summary_max_tokens: u32,
}

impl SessionManager {
    pub fn new(
        db: Database,
        provider: Arc<dyn TextProvider>,
        max_age_hours: i64,
        summary_min_messages: usize,
        summary_max_tokens: u32,
    ) -> Self {
        Self {
            db,
            provider,
            max_age_hours,
            summary_min_messages,
            summary_max_tokens,
        }
    }

    /// Resolve the session for an inbound message.
    ///
    /// Reuses the most recent active session while it is younger than the
    /// configured maximum; otherwise closes it and opens a new one. Storage
    /// failures degrade to a placeholder handle, never an error.
    pub async fn get_or_create_session(&self, user_id: &str) -> SessionHandle {
        let active = match queries::find_active_session(&self.db, user_id).await {
            Ok(active) => active,
            Err(e) => {
                warn!(user_id, error = %e, "session lookup failed, degrading");
                return SessionHandle::degraded();
            }
        };

        if let Some(session) = active {
            if self.is_fresh(&session) {
                debug!(user_id, session_id = %session.id, "reusing active session");
                return SessionHandle {
                    id: Some(session.id),
                };
            }
            if let Err(e) = self.close(&session).await {
                warn!(user_id, session_id = %session.id, error = %e, "session close failed");
            }
        }

        let session = Session::new(user_id, None);
        match queries::create_session(&self.db, &session).await {
            Ok(()) => {
                info!(user_id, session_id = %session.id, "opened session");
                SessionHandle {
                    id: Some(session.id),
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "session create failed, degrading");
                SessionHandle::degraded()
            }
        }
    }

    /// Close a session, attaching a summary when the dialogue was long
    /// enough and the provider cooperates. Summary failures are swallowed.
    pub async fn close(&self, session: &Session) -> Result<(), CoraError> {
        let messages = queries::get_messages_for_session(&self.db, &session.id).await?;
        let summary = if messages.len() > self.summary_min_messages {
            self.summarize(&messages).await
        } else {
            None
        };
        queries::close_session(&self.db, &session.id, &now_rfc3339(), summary.clone()).await?;
        info!(session_id = %session.id, summarized = summary.is_some(), "closed session");
        Ok(())
    }

    fn is_fresh(&self, session: &Session) -> bool {
        match DateTime::parse_from_rfc3339(&session.started_at) {
            Ok(started) => {
                Utc::now().signed_duration_since(started) < Duration::hours(self.max_age_hours)
            }
            Err(e) => {
                // Unparseable start time: treat as expired rather than
                // pinning the user to a broken session forever.
                warn!(session_id = %session.id, error = %e, "bad session timestamp");
                false
            }
        }
    }

    async fn summarize(
        &self,
        messages: &[cora_core::types::ConversationMessage],
    ) -> Option<String> {
        let dialogue: Vec<String> = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect();
        let prompt = format!(
            "Resuma a conversa abaixo em uma ou duas frases, em português, \
             destacando decisões e pendências.\n\n{}",
            dialogue.join("\n")
        );
        match self
            .provider
            .generate(&prompt, 0.3, self.summary_max_tokens)
            .await
        {
            Ok(summary) => {
                let summary = summary.trim().to_string();
                (!summary.is_empty()).then_some(summary)
            }
            Err(e) => {
                warn!(error = %e, "session summary failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cora_core::types::{ConversationMessage, MessageRole};
    use cora_test_utils::MockProvider;
    use tempfile::tempdir;

    async fn setup(provider: MockProvider) -> (SessionManager, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let manager = SessionManager::new(db.clone(), Arc::new(provider), 6, 3, 200);
        (manager, db, dir)
    }

    #[tokio::test]
    async fn sessions_are_reused_within_the_age_window() {
        let (manager, _db, _dir) = setup(MockProvider::new()).await;

        let first = manager.get_or_create_session("user-1").await;
        let second = manager.get_or_create_session("user-1").await;
        assert!(first.id.is_some());
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn old_sessions_expire_into_new_ones() {
        let (manager, db, _dir) = setup(MockProvider::new()).await;

        let mut stale = Session::new("user-1", None);
        stale.started_at = (Utc::now() - Duration::hours(7)).to_rfc3339();
        queries::create_session(&db, &stale).await.unwrap();

        let handle = manager.get_or_create_session("user-1").await;
        let new_id = handle.id.unwrap();
        assert_ne!(new_id, stale.id);

        let closed = queries::get_session(&db, &stale.id).await.unwrap().unwrap();
        assert!(!closed.is_active);
        assert!(closed.ended_at.is_some());
    }

    #[tokio::test]
    async fn closing_a_long_session_attaches_a_summary() {
        let provider =
            MockProvider::with_responses(vec!["Conversa sobre o relatório de vendas.".to_string()]);
        let (manager, db, _dir) = setup(provider).await;

        let session = Session::new("user-1", None);
        queries::create_session(&db, &session).await.unwrap();
        for i in 0..4 {
            let msg = ConversationMessage::new(
                session.id.clone(),
                "user-1",
                MessageRole::User,
                format!("mensagem {i}"),
                "cli",
            );
            queries::insert_message(&db, &msg).await.unwrap();
        }

        manager.close(&session).await.unwrap();

        let closed = queries::get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(
            closed.summary.as_deref(),
            Some("Conversa sobre o relatório de vendas.")
        );
    }

    #[tokio::test]
    async fn short_sessions_close_without_a_summary() {
        let (manager, db, _dir) = setup(MockProvider::new()).await;

        let session = Session::new("user-1", None);
        queries::create_session(&db, &session).await.unwrap();
        let msg = ConversationMessage::new(
            session.id.clone(),
            "user-1",
            MessageRole::User,
            "oi",
            "cli",
        );
        queries::insert_message(&db, &msg).await.unwrap();

        manager.close(&session).await.unwrap();

        let closed = queries::get_session(&db, &session.id).await.unwrap().unwrap();
        assert!(closed.summary.is_none());
    }

    #[tokio::test]
    async fn storage_failure_yields_a_degraded_session() {
        let (manager, db, _dir) = setup(MockProvider::new()).await;

        // Persistence gone: the turn must still get a handle, just one with
        // no id and nothing written behind it.
        db.close().await.unwrap();

        let handle = manager.get_or_create_session("user-1").await;
        assert!(handle.id.is_none());
    }

    #[tokio::test]
    async fn summary_failure_still_closes_the_session() {
        let (manager, db, _dir) = setup(MockProvider::failing()).await;

        let session = Session::new("user-1", None);
        queries::create_session(&db, &session).await.unwrap();
        for i in 0..4 {
            let msg = ConversationMessage::new(
                session.id.clone(),
                "user-1",
                MessageRole::User,
                format!("mensagem {i}"),
                "cli",
            );
            queries::insert_message(&db, &msg).await.unwrap();
        }

        manager.close(&session).await.unwrap();

        let closed = queries::get_session(&db, &session.id).await.unwrap().unwrap();
        assert!(!closed.is_active);
        assert!(closed.summary.is_none());
    }
}
