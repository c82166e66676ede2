// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use cora_core::CoraError;
use tokio_rusqlite::Connection;
use tracing::info;

use crate::migrations;

/// Convert tokio_rusqlite errors into `CoraError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> CoraError {
    CoraError::Storage {
        source: Box::new(e),
    }
}

/// Current UTC time as an RFC3339 string, the canonical timestamp format for
/// every TEXT time column in the schema.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Handle to the single SQLite connection shared by all stores.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, applies PRAGMAs, and runs
    /// all pending migrations.
    pub async fn open(path: &str) -> Result<Self, CoraError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`], with WAL journaling made optional.
    pub async fn open_with(path: &str, wal: bool) -> Result<Self, CoraError> {
        let parent = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent).map_err(CoraError::storage)?;
        }

        let conn = Connection::open(path).await.map_err(CoraError::storage)?;
        Self::setup(conn, wal).await
    }

    /// Opens an in-memory database with the full schema. Test use only has
    /// no file to clean up; production always goes through [`Database::open`].
    pub async fn open_in_memory() -> Result<Self, CoraError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(CoraError::storage)?;
        Self::setup(conn, false).await
    }

    async fn setup(conn: Connection, wal: bool) -> Result<Self, CoraError> {
        conn.call(move |conn| {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(e.into()))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        info!("database opened and migrated");
        Ok(Self { conn })
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing pending writes. Clones, since `close`
    /// consumes its handle.
    pub async fn close(&self) -> Result<(), CoraError> {
        self.conn.clone().close().await.map_err(map_tr_err)
    }
}
