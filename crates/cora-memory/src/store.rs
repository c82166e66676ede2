// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed memory store.
//!
//! Importance is clamped on every write path; retrieval candidates come out
//! pre-ordered by importance then access recency.

use std::str::FromStr;

use cora_core::CoraError;
use cora_storage::Database;
use cora_storage::database::{map_tr_err, now_rfc3339};
use rusqlite::params;

use crate::types::{Memory, MemoryCategory, clamp_importance};

const MEMORY_COLUMNS: &str = "id, user_id, category, content, importance, is_active, \
     access_count, last_accessed_at, created_at, session_id, message_id";

fn row_to_memory(row: &rusqlite::Row) -> Result<Memory, rusqlite::Error> {
    let category_str: String = row.get(2)?;
    let category = MemoryCategory::from_str(&category_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(Memory {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category,
        content: row.get(3)?,
        importance: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        access_count: row.get(6)?,
        last_accessed_at: row.get(7)?,
        created_at: row.get(8)?,
        session_id: row.get(9)?,
        message_id: row.get(10)?,
    })
}

/// Persistent store for memories.
pub struct MemoryStore {
    db: Database,
}

impl MemoryStore {
    /// Creates a new store over the shared database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Save a memory. Importance is clamped even if the caller bypassed
    /// [`Memory::new`].
    pub async fn save(&self, memory: &Memory) -> Result<(), CoraError> {
        let mut memory = memory.clone();
        memory.importance = clamp_importance(memory.importance);
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO memories \
                     (id, user_id, category, content, importance, is_active, access_count, \
                      last_accessed_at, created_at, session_id, message_id) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        memory.id,
                        memory.user_id,
                        memory.category.to_string(),
                        memory.content,
                        memory.importance,
                        memory.is_active as i64,
                        memory.access_count,
                        memory.last_accessed_at,
                        memory.created_at,
                        memory.session_id,
                        memory.message_id,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Get a memory by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Memory>, CoraError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"
                ))?;
                let result = stmt.query_row(params![id], row_to_memory);
                match result {
                    Ok(memory) => Ok(Some(memory)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    /// Update a memory's content and importance (clamped).
    pub async fn update(
        &self,
        id: &str,
        content: &str,
        importance: i64,
    ) -> Result<(), CoraError> {
        let id = id.to_string();
        let content = content.to_string();
        let importance = clamp_importance(importance);
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET content = ?1, importance = ?2 WHERE id = ?3",
                    params![content, importance, id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Deactivate a memory. The core never hard-deletes.
    pub async fn deactivate(&self, id: &str) -> Result<(), CoraError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET is_active = 0 WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Retrieval candidates for a user: active memories ordered by importance
    /// descending, then last-access recency descending, capped at `cap`.
    pub async fn fetch_candidates(
        &self,
        user_id: &str,
        cap: usize,
    ) -> Result<Vec<Memory>, CoraError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {MEMORY_COLUMNS} FROM memories \
                     WHERE user_id = ?1 AND is_active = 1 \
                     ORDER BY importance DESC, last_accessed_at DESC \
                     LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![user_id, cap as i64], row_to_memory)?;
                let mut memories = Vec::new();
                for row in rows {
                    memories.push(row?);
                }
                Ok(memories)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Access bookkeeping for returned memories: bump `access_count` and
    /// refresh `last_accessed_at`. A read that mutates state, by contract.
    pub async fn touch(&self, ids: &[String]) -> Result<(), CoraError> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids = ids.to_vec();
        let now = now_rfc3339();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "UPDATE memories \
                         SET access_count = access_count + 1, last_accessed_at = ?1 \
                         WHERE id = ?2",
                    )?;
                    for id in &ids {
                        stmt.execute(params![now, id])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Count active memories, for the status surface.
    pub async fn count_active(&self) -> Result<i64, CoraError> {
        self.db
            .connection()
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT count(*) FROM memories WHERE is_active = 1",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .map_err(map_tr_err)
    }
}
