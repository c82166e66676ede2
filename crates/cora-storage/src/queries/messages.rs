// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation message operations. Append-only; `created_at` ordering is
//! the canonical dialogue order.

use std::str::FromStr;

use cora_core::CoraError;
use cora_core::types::MessageRole;
use rusqlite::params;

use crate::database::Database;
use crate::models::ConversationMessage;

const MESSAGE_COLUMNS: &str =
    "id, session_id, user_id, role, content, source, intent, actions_taken, created_at";

fn row_to_message(row: &rusqlite::Row) -> Result<ConversationMessage, rusqlite::Error> {
    let role_str: String = row.get(3)?;
    let role = MessageRole::from_str(&role_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(ConversationMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_id: row.get(2)?,
        role,
        content: row.get(4)?,
        source: row.get(5)?,
        intent: row.get(6)?,
        actions_taken: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &ConversationMessage) -> Result<(), CoraError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_messages \
                 (id, session_id, user_id, role, content, source, intent, actions_taken, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    msg.id,
                    msg.session_id,
                    msg.user_id,
                    msg.role.to_string(),
                    msg.content,
                    msg.source,
                    msg.intent,
                    msg.actions_taken,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get all messages for a session in chronological order.
pub async fn get_messages_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ConversationMessage>, CoraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM conversation_messages \
                 WHERE session_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the last `limit` messages for a session, returned in chronological
/// order (the dialogue tail for context bundles).
pub async fn get_recent_messages(
    db: &Database,
    session_id: &str,
    limit: usize,
) -> Result<Vec<ConversationMessage>, CoraError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM conversation_messages \
                 WHERE session_id = ?1 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![session_id, limit as i64], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            // Fetched newest-first; flip back to dialogue order.
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count user-authored messages for a user on a given UTC calendar day.
///
/// `day` is a `YYYY-MM-DD` prefix of the RFC3339 `created_at` column. Drives
/// the every-20th-message deep-analysis sampling in the pattern learner.
pub async fn count_user_messages_on_day(
    db: &Database,
    user_id: &str,
    day: &str,
) -> Result<i64, CoraError> {
    let user_id = user_id.to_string();
    let pattern = format!("{day}%");
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT count(*) FROM conversation_messages \
                 WHERE user_id = ?1 AND role = 'user' AND created_at LIKE ?2",
                params![user_id, pattern],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Last `limit` user-authored messages for a user across sessions, in
/// chronological order. Feeds the deep-analysis style classification.
pub async fn get_recent_user_messages(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<ConversationMessage>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM conversation_messages \
                 WHERE user_id = ?1 AND role = 'user' \
                 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![user_id, limit as i64], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::now_rfc3339;
    use crate::models::Session;
    use crate::queries::sessions::create_session;
    use tempfile::tempdir;

    async fn setup_db_with_session() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let session = Session {
            id: "sess-1".to_string(),
            user_id: "user-1".to_string(),
            mode_id: None,
            started_at: now_rfc3339(),
            ended_at: None,
            is_active: true,
            message_count: 0,
            summary: None,
        };
        create_session(&db, &session).await.unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, role: MessageRole, content: &str, timestamp: &str) -> ConversationMessage {
        ConversationMessage {
            id: id.to_string(),
            session_id: "sess-1".to_string(),
            user_id: "user-1".to_string(),
            role,
            content: content.to_string(),
            source: "cli".to_string(),
            intent: None,
            actions_taken: None,
            created_at: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_messages_in_order() {
        let (db, _dir) = setup_db_with_session().await;

        let m1 = make_msg("m1", MessageRole::User, "oi", "2026-01-01T00:00:01+00:00");
        let m2 = make_msg(
            "m2",
            MessageRole::Assistant,
            "olá!",
            "2026-01-01T00:00:02+00:00",
        );
        let m3 = make_msg("m3", MessageRole::User, "tudo bem?", "2026-01-01T00:00:03+00:00");

        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();
        insert_message(&db, &m3).await.unwrap();

        let messages = get_messages_for_session(&db, "sess-1").await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[2].id, "m3");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_messages_returns_tail_in_dialogue_order() {
        let (db, _dir) = setup_db_with_session().await;

        for i in 0..6 {
            let msg = make_msg(
                &format!("m{i}"),
                MessageRole::User,
                &format!("mensagem {i}"),
                &format!("2026-01-01T00:00:0{i}+00:00"),
            );
            insert_message(&db, &msg).await.unwrap();
        }

        let tail = get_recent_messages(&db, "sess-1", 3).await.unwrap();
        assert_eq!(tail.len(), 3);
        // The newest three, oldest of them first.
        assert_eq!(tail[0].id, "m3");
        assert_eq!(tail[2].id, "m5");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_user_messages_filters_role_and_day() {
        let (db, _dir) = setup_db_with_session().await;

        insert_message(&db, &make_msg("m1", MessageRole::User, "a", "2026-02-10T09:00:00+00:00"))
            .await
            .unwrap();
        insert_message(&db, &make_msg("m2", MessageRole::Assistant, "b", "2026-02-10T09:00:01+00:00"))
            .await
            .unwrap();
        insert_message(&db, &make_msg("m3", MessageRole::User, "c", "2026-02-11T09:00:00+00:00"))
            .await
            .unwrap();

        let count = count_user_messages_on_day(&db, "user-1", "2026-02-10")
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await.unwrap();
    }
}
