// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end turn flow against a temp database and a mock provider.

use std::sync::Arc;

use cora_context::{ContextAggregator, ContextOptions};
use cora_core::TextProvider;
use cora_engine::{
    ActionExecutor, GenerationOptions, Intent, Orchestrator, SessionManager, TurnRequest,
};
use cora_memory::{MemoryRetriever, MemoryStore};
use cora_patterns::{PatternLearner, PatternStore};
use cora_storage::{Database, queries};
use cora_test_utils::MockProvider;
use tempfile::tempdir;

fn build(db: &Database, provider: Arc<dyn TextProvider>) -> Orchestrator {
    Orchestrator::new(
        db.clone(),
        SessionManager::new(db.clone(), Arc::clone(&provider), 6, 3, 200),
        ContextAggregator::new(
            db.clone(),
            MemoryRetriever::new(MemoryStore::new(db.clone())),
            PatternStore::new(db.clone()),
            ContextOptions::default(),
        ),
        ActionExecutor::new(db.clone(), MemoryStore::new(db.clone())),
        Arc::new(PatternLearner::new(
            PatternStore::new(db.clone()),
            db.clone(),
            Arc::clone(&provider),
            20,
        )),
        provider,
        GenerationOptions {
            system_prompt: "Você é a Cora, uma assistente pessoal.".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        },
    )
}

fn request(text: &str) -> TurnRequest {
    TurnRequest {
        user_id: "user-1".to_string(),
        text: text.to_string(),
        source: "cli".to_string(),
    }
}

#[tokio::test]
async fn task_directive_round_trip() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("t.db").to_str().unwrap())
        .await
        .unwrap();
    let provider: Arc<dyn TextProvider> = Arc::new(MockProvider::with_responses(vec![
        "Anotado, vou registrar isso! [AÇÃO: task | Terminar o relatório]".to_string(),
    ]));
    let orchestrator = build(&db, provider);

    let outcome = orchestrator
        .handle_message(request("Preciso terminar o relatório até amanhã"))
        .await;

    assert_eq!(outcome.intent, Intent::CreateTask);
    assert!(!outcome.response.contains("[AÇÃO:"));
    assert_eq!(outcome.actions.len(), 1);
    assert_eq!(outcome.actions[0].kind, "task");
    assert_eq!(outcome.actions[0].details, "Terminar o relatório");

    let session_id = outcome.session_id.expect("durable session");
    let tasks = queries::list_pending_tasks(&db, "user-1", 10).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Terminar o relatório");

    let messages = queries::get_messages_for_session(&db, &session_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].intent.as_deref(), Some("create_task"));
    assert!(messages[1].actions_taken.is_some());
}

#[tokio::test]
async fn consecutive_turns_share_a_session() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("t.db").to_str().unwrap())
        .await
        .unwrap();
    let provider: Arc<dyn TextProvider> = Arc::new(MockProvider::new());
    let orchestrator = build(&db, provider);

    let first = orchestrator.handle_message(request("bom dia")).await;
    let second = orchestrator.handle_message(request("tudo bem?")).await;
    assert!(first.session_id.is_some());
    assert_eq!(first.session_id, second.session_id);

    let session = queries::get_session(&db, first.session_id.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.message_count, 4);
}

#[tokio::test]
async fn provider_failure_degrades_to_fallback_reply() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("t.db").to_str().unwrap())
        .await
        .unwrap();
    let provider: Arc<dyn TextProvider> = Arc::new(MockProvider::failing());
    let orchestrator = build(&db, provider);

    let outcome = orchestrator.handle_message(request("oi, tudo bem?")).await;
    assert!(outcome.response.contains("Desculpe"));
    assert!(outcome.actions.is_empty());
    // The turn is still persisted under a real session.
    assert!(outcome.session_id.is_some());
}

#[tokio::test]
async fn memoria_directive_reports_created_memory() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("t.db").to_str().unwrap())
        .await
        .unwrap();
    let provider: Arc<dyn TextProvider> = Arc::new(MockProvider::with_responses(vec![
        "Vou lembrar disso. [AÇÃO: memoria | prefere reuniões de manhã]".to_string(),
    ]));
    let orchestrator = build(&db, provider);

    let outcome = orchestrator
        .handle_message(request("prefiro reuniões de manhã, combinado?"))
        .await;
    assert_eq!(outcome.created_memories.len(), 1);

    let store = MemoryStore::new(db);
    let memory = store
        .get_by_id(&outcome.created_memories[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(memory.content, "prefere reuniões de manhã");
}

#[tokio::test]
async fn malformed_marker_passes_through_unexecuted() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("t.db").to_str().unwrap())
        .await
        .unwrap();
    let provider: Arc<dyn TextProvider> = Arc::new(MockProvider::with_responses(vec![
        "Entendi. [AÇÃO: task sem delimitador]".to_string(),
    ]));
    let orchestrator = build(&db, provider);

    let outcome = orchestrator.handle_message(request("anota isso")).await;
    assert!(outcome.actions.is_empty());
    assert!(outcome.response.contains("[AÇÃO: task sem delimitador]"));
}
