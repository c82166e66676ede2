// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cora status` command implementation.
//!
//! Opens the database and prints row counters plus a configuration summary.

use colored::Colorize;
use cora_config::CoraConfig;
use cora_core::CoraError;
use cora_memory::MemoryStore;
use cora_patterns::PatternStore;
use cora_storage::{Database, queries};

pub async fn run_status(config: &CoraConfig) -> Result<(), CoraError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;

    let sessions = queries::count_sessions(&db).await?;
    let memories = MemoryStore::new(db.clone()).count_active().await?;
    let patterns = PatternStore::new(db.clone()).count_active().await?;

    println!("{}", "cora status".bold().green());
    println!("  banco de dados: {}", config.storage.database_path);
    println!("  modelo: {}", config.provider.default_model);
    println!("  sessões: {sessions}");
    println!("  memórias ativas: {memories}");
    println!("  padrões ativos: {patterns}");

    db.close().await?;
    Ok(())
}
