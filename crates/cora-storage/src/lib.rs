// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Cora assistant.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! operations for sessions, messages, and the domain tables the core reads
//! and writes.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, now_rfc3339};
pub use models::*;
