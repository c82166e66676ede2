// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cora shell` command implementation.
//!
//! Interactive REPL with readline history. Each line is one turn through
//! the orchestrator; slash commands drive explicit memory capture,
//! retrieval preview, and the answer accumulator.

use std::sync::Arc;

use colored::Colorize;
use cora_anthropic::AnthropicProvider;
use cora_config::CoraConfig;
use cora_context::{ContextAggregator, ContextOptions};
use cora_core::{CoraError, TextProvider};
use cora_engine::{
    ActionExecutor, AnswerAccumulator, GenerationOptions, Orchestrator, SessionManager,
    TurnRequest,
};
use cora_memory::{Memory, MemoryCategory, MemoryRetriever, MemoryStore};
use cora_patterns::{PatternLearner, PatternStore};
use cora_storage::Database;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

/// Single-user deployment: every row belongs to this user.
const LOCAL_USER: &str = "local";

const DEFAULT_SYSTEM_PROMPT: &str = "Você é a Cora, uma assistente pessoal atenciosa e \
direta. Responda sempre em português. Quando o usuário pedir algo que vire tarefa, \
captura ou lembrete, inclua no final da resposta um marcador no formato \
[AÇÃO: task | descrição], [AÇÃO: inbox | descrição] ou [AÇÃO: reminder | descrição]. \
Use [AÇÃO: memoria | fato] para registrar um fato importante sobre o usuário.";

/// Everything the REPL needs, constructed once at startup.
struct ShellState {
    orchestrator: Orchestrator,
    memories: MemoryStore,
    retriever: MemoryRetriever,
    accumulator: AnswerAccumulator,
}

fn build_state(config: &CoraConfig, db: Database) -> Result<ShellState, CoraError> {
    let api_key = config.provider.api_key.as_deref().ok_or_else(|| {
        CoraError::Config(
            "Anthropic API key required. Set provider.api_key or CORA_PROVIDER_API_KEY".into(),
        )
    })?;
    let provider: Arc<dyn TextProvider> = Arc::new(AnthropicProvider::new(
        api_key,
        config.provider.default_model.clone(),
    )?);

    let sessions = SessionManager::new(
        db.clone(),
        Arc::clone(&provider),
        config.session.max_age_hours,
        config.session.summary_min_messages,
        config.session.summary_max_tokens,
    );
    let aggregator = ContextAggregator::new(
        db.clone(),
        MemoryRetriever::new(MemoryStore::new(db.clone())),
        PatternStore::new(db.clone()),
        ContextOptions {
            max_memories: config.context.max_memories,
            recent_messages: config.context.recent_messages,
            event_window_days: config.context.event_window_days,
            min_pattern_confidence: config.patterns.min_confidence,
        },
    );
    let executor = ActionExecutor::new(db.clone(), MemoryStore::new(db.clone()));
    let learner = Arc::new(PatternLearner::new(
        PatternStore::new(db.clone()),
        db.clone(),
        Arc::clone(&provider),
        config.patterns.deep_analysis_interval,
    ));

    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let orchestrator = Orchestrator::new(
        db.clone(),
        sessions,
        aggregator,
        executor,
        learner,
        provider,
        GenerationOptions {
            system_prompt,
            temperature: config.provider.temperature,
            max_tokens: config.provider.max_tokens,
        },
    );

    Ok(ShellState {
        orchestrator,
        memories: MemoryStore::new(db.clone()),
        retriever: MemoryRetriever::new(MemoryStore::new(db)),
        accumulator: AnswerAccumulator::new(),
    })
}

/// Runs the interactive REPL.
pub async fn run_shell(config: CoraConfig) -> Result<(), CoraError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let state = build_state(&config, db.clone())?;
    info!(database = %config.storage.database_path, "shell ready");

    let mut rl = DefaultEditor::new()
        .map_err(|e| CoraError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!("Digite {} para encerrar.\n", "/sair".yellow());

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/sair" || trimmed == "/quit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if let Err(e) = handle_line(&state, trimmed).await {
                    eprintln!("{}: {e}", "erro".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "erro".red());
                break;
            }
        }
    }

    db.close().await?;
    println!("{}", "até logo".dimmed());
    Ok(())
}

async fn handle_line(state: &ShellState, line: &str) -> Result<(), CoraError> {
    if let Some(rest) = line.strip_prefix("/lembrar ") {
        return remember(state, rest).await;
    }
    if let Some(query) = line.strip_prefix("/memorias ") {
        return preview_memories(state, query.trim()).await;
    }
    if let Some(rest) = line.strip_prefix("/parte ") {
        return append_part(state, rest).await;
    }
    if let Some(id) = line.strip_prefix("/fim ") {
        return finish_answer(state, id.trim()).await;
    }

    let outcome = state
        .orchestrator
        .handle_message(TurnRequest {
            user_id: LOCAL_USER.to_string(),
            text: line.to_string(),
            source: "cli".to_string(),
        })
        .await;

    println!("{}", outcome.response);
    for action in &outcome.actions {
        println!("{}", format!("  ✓ {}: {}", action.kind, action.details).dimmed());
    }
    Ok(())
}

/// `/lembrar <importância> <texto>`: explicit memory capture.
async fn remember(state: &ShellState, rest: &str) -> Result<(), CoraError> {
    let mut parts = rest.trim().splitn(2, ' ');
    let importance: i64 = parts
        .next()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| CoraError::Config("uso: /lembrar <importância 1-10> <texto>".into()))?;
    let content = parts
        .next()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| CoraError::Config("uso: /lembrar <importância 1-10> <texto>".into()))?;

    let memory = Memory::new(LOCAL_USER, MemoryCategory::Fact, content, importance);
    state.memories.save(&memory).await?;
    println!(
        "{}",
        format!("memória guardada (importância {})", memory.importance).dimmed()
    );
    Ok(())
}

/// `/memorias <consulta>`: retrieval preview with scores.
async fn preview_memories(state: &ShellState, query: &str) -> Result<(), CoraError> {
    let results = state.retriever.search(LOCAL_USER, query, 10).await?;
    if results.is_empty() {
        println!("{}", "nenhuma memória encontrada".dimmed());
        return Ok(());
    }
    for scored in results {
        println!(
            "  [{:.2}] ({}) {}",
            scored.score, scored.memory.category, scored.memory.content
        );
    }
    Ok(())
}

/// `/parte <id> <texto>`: append a part to an in-progress answer.
async fn append_part(state: &ShellState, rest: &str) -> Result<(), CoraError> {
    let mut parts = rest.trim().splitn(2, ' ');
    let question_id = parts
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CoraError::Config("uso: /parte <id> <texto>".into()))?;
    let text = parts
        .next()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| CoraError::Config("uso: /parte <id> <texto>".into()))?;

    let count = state
        .accumulator
        .append(LOCAL_USER, question_id, text)
        .await;
    println!("{}", format!("parte {count} guardada para {question_id}").dimmed());
    Ok(())
}

/// `/fim <id>`: finalize and print the accumulated answer.
async fn finish_answer(state: &ShellState, question_id: &str) -> Result<(), CoraError> {
    match state.accumulator.finalize(LOCAL_USER, question_id).await {
        Some(answer) => println!("{answer}"),
        None => println!("{}", format!("nada acumulado para {question_id}").dimmed()),
    }
    Ok(())
}
