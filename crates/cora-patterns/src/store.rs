// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge-upsert persistence for learned patterns.

use std::str::FromStr;

use cora_core::CoraError;
use cora_storage::Database;
use cora_storage::database::{map_tr_err, now_rfc3339};
use rusqlite::{OptionalExtension, params};

use crate::types::{LearnedPattern, PatternData, PatternKind, confidence_for};

fn json_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn row_to_pattern(row: &rusqlite::Row) -> Result<LearnedPattern, rusqlite::Error> {
    let kind_str: String = row.get(2)?;
    let kind = PatternKind::from_str(&kind_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let data_json: String = row.get(5)?;
    let data: PatternData = serde_json::from_str(&data_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(LearnedPattern {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        name: row.get(3)?,
        description: row.get(4)?,
        data,
        confidence: row.get(6)?,
        sample_count: row.get(7)?,
        is_active: row.get::<_, i64>(8)? != 0,
        updated_at: row.get(9)?,
    })
}

const PATTERN_COLUMNS: &str = "id, user_id, pattern_type, name, description, pattern_data, \
     confidence, sample_count, is_active, updated_at";

/// Persistent store for learned patterns, keyed `(user_id, pattern_type, name)`.
pub struct PatternStore {
    db: Database,
}

impl PatternStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record one observation.
    ///
    /// Absent key: insert with `sample_count = 1`. Present key: merge the
    /// payload counters, bump `sample_count`, recompute confidence. The
    /// stored confidence never decreases across upserts.
    pub async fn upsert_observation(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        data: PatternData,
    ) -> Result<(), CoraError> {
        let user_id = user_id.to_string();
        let kind = data.kind().to_string();
        let name = name.to_string();
        let description = description.map(str::to_string);
        let now = now_rfc3339();
        self.db
            .connection()
            .call(move |conn| {
                let existing = conn
                    .query_row(
                        &format!(
                            "SELECT {PATTERN_COLUMNS} FROM learned_patterns \
                             WHERE user_id = ?1 AND pattern_type = ?2 AND name = ?3"
                        ),
                        params![user_id, kind, name],
                        row_to_pattern,
                    )
                    .optional()?;

                match existing {
                    Some(mut pattern) => {
                        pattern.data.merge(&data);
                        let samples = pattern.sample_count + 1;
                        let confidence = pattern.confidence.max(confidence_for(samples));
                        let data_json =
                            serde_json::to_string(&pattern.data).map_err(json_err)?;
                        conn.execute(
                            "UPDATE learned_patterns \
                             SET pattern_data = ?1, confidence = ?2, sample_count = ?3, \
                                 updated_at = ?4, \
                                 description = COALESCE(?5, description) \
                             WHERE id = ?6",
                            params![data_json, confidence, samples, now, description, pattern.id],
                        )?;
                    }
                    None => {
                        let data_json = serde_json::to_string(&data).map_err(json_err)?;
                        conn.execute(
                            "INSERT INTO learned_patterns \
                             (id, user_id, pattern_type, name, description, pattern_data, \
                              confidence, sample_count, is_active, updated_at) \
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 1, ?8)",
                            params![
                                uuid::Uuid::new_v4().to_string(),
                                user_id,
                                kind,
                                name,
                                description,
                                data_json,
                                confidence_for(1),
                                now,
                            ],
                        )?;
                    }
                }
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Active patterns at or above a confidence floor, most confident first.
    pub async fn list_active(
        &self,
        user_id: &str,
        min_confidence: f64,
    ) -> Result<Vec<LearnedPattern>, CoraError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PATTERN_COLUMNS} FROM learned_patterns \
                     WHERE user_id = ?1 AND is_active = 1 AND confidence >= ?2 \
                     ORDER BY confidence DESC, updated_at DESC"
                ))?;
                let rows = stmt.query_map(params![user_id, min_confidence], row_to_pattern)?;
                let mut patterns = Vec::new();
                for row in rows {
                    patterns.push(row?);
                }
                Ok(patterns)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Count active patterns, for the status surface.
    pub async fn count_active(&self) -> Result<i64, CoraError> {
        self.db
            .connection()
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT count(*) FROM learned_patterns WHERE is_active = 1",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .map_err(map_tr_err)
    }
}
