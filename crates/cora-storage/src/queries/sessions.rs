// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation session CRUD operations.

use cora_core::CoraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Session;

fn row_to_session(row: &rusqlite::Row) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mode_id: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        message_count: row.get(6)?,
        summary: row.get(7)?,
    })
}

const SESSION_COLUMNS: &str =
    "id, user_id, mode_id, started_at, ended_at, is_active, message_count, summary";

/// Create a new session.
pub async fn create_session(db: &Database, session: &Session) -> Result<(), CoraError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_sessions \
                 (id, user_id, mode_id, started_at, ended_at, is_active, message_count, summary) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    session.id,
                    session.user_id,
                    session.mode_id,
                    session.started_at,
                    session.ended_at,
                    session.is_active as i64,
                    session.message_count,
                    session.summary,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, CoraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM conversation_sessions WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_session);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the most recently started active session for a user.
///
/// The schema invariant allows at most one, but ordering by `started_at`
/// descending makes the query robust against historical duplicates.
pub async fn find_active_session(
    db: &Database,
    user_id: &str,
) -> Result<Option<Session>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM conversation_sessions \
                 WHERE user_id = ?1 AND is_active = 1 \
                 ORDER BY started_at DESC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![user_id], row_to_session);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Close a session: terminal transition, with an optional generated summary.
pub async fn close_session(
    db: &Database,
    id: &str,
    ended_at: &str,
    summary: Option<String>,
) -> Result<(), CoraError> {
    let id = id.to_string();
    let ended_at = ended_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversation_sessions \
                 SET is_active = 0, ended_at = ?1, summary = COALESCE(?2, summary) \
                 WHERE id = ?3",
                params![ended_at, summary, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump a session's message counter after persisting a turn.
pub async fn increment_message_count(db: &Database, id: &str) -> Result<(), CoraError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversation_sessions SET message_count = message_count + 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count sessions, for the status surface.
pub async fn count_sessions(db: &Database) -> Result<i64, CoraError> {
    db.connection()
        .call(|conn| {
            Ok(conn.query_row("SELECT count(*) FROM conversation_sessions", [], |row| {
                row.get(0)
            })?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
