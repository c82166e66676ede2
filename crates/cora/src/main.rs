// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cora - a conversational personal assistant.
//!
//! Binary entry point: loads configuration, initializes tracing, and
//! dispatches to the subcommands.

mod shell;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Cora - a conversational personal assistant.
#[derive(Parser, Debug)]
#[command(name = "cora", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive conversation.
    Shell,
    /// Show database counters and configuration summary.
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cora_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cora: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Shell) | None => shell::run_shell(config).await,
        Some(Commands::Status) => status::run_status(&config).await,
    };

    if let Err(e) = result {
        eprintln!("cora: {e}");
        std::process::exit(1);
    }
}
