// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message control flow of the assistant.
//!
//! One inbound message becomes one logical unit of work: resolve the
//! session, assemble context, one provider call, post-process, apply
//! directives, persist the turn, and fire the non-blocking learner update.

pub mod accumulator;
pub mod actions;
pub mod intent;
pub mod postprocess;
pub mod session;

use std::sync::Arc;

use chrono::Utc;
use cora_context::{ContextAggregator, format_context_for_prompt};
use cora_core::TextProvider;
use cora_core::types::{ConversationMessage, ExecutedAction, MessageRole};
use cora_patterns::PatternLearner;
use cora_storage::{Database, queries};
use tracing::{debug, warn};

pub use accumulator::AnswerAccumulator;
pub use actions::{ActionExecutor, ExecutionReport};
pub use intent::Intent;
pub use session::{SessionHandle, SessionManager};

/// Fixed local reply when the provider is unreachable. Never exposes error
/// detail.
const FALLBACK_REPLY: &str =
    "Desculpe, tive um problema para responder agora. Pode tentar de novo em instantes?";

/// One inbound message from the upstream caller.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub user_id: String,
    pub text: String,
    /// Channel tag, e.g. "cli".
    pub source: String,
}

/// What the caller gets back for one turn.
#[derive(Debug)]
pub struct TurnOutcome {
    pub response: String,
    pub intent: Intent,
    pub actions: Vec<ExecutedAction>,
    pub created_memories: Vec<String>,
    /// `None` when the turn ran under a degraded (unpersisted) session.
    pub session_id: Option<String>,
}

/// Generation knobs for the one provider call per turn.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Sequences every component around one text-generation call.
pub struct Orchestrator {
    db: Database,
    sessions: SessionManager,
    aggregator: ContextAggregator,
    executor: ActionExecutor,
    learner: Arc<PatternLearner>,
    provider: Arc<dyn TextProvider>,
    options: GenerationOptions,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Database,
        sessions: SessionManager,
        aggregator: ContextAggregator,
        executor: ActionExecutor,
        learner: Arc<PatternLearner>,
        provider: Arc<dyn TextProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            db,
            sessions,
            aggregator,
            executor,
            learner,
            provider,
            options,
        }
    }

    /// Handle one inbound message end to end.
    ///
    /// Infallible by contract: collaborator failures degrade (placeholder
    /// session, partial context, fallback reply, unpersisted turn) instead
    /// of surfacing. The reply text is always scrubbed before it leaves.
    pub async fn handle_message(&self, request: TurnRequest) -> TurnOutcome {
        let intent = intent::classify(&request.text);
        let session = self.sessions.get_or_create_session(&request.user_id).await;

        let bundle = self
            .aggregator
            .get_context_for_message(&request.user_id, &request.text, session.id.as_deref())
            .await;
        let prompt = self.render_prompt(&bundle, &request.text);

        let raw = match self
            .provider
            .generate(&prompt, self.options.temperature, self.options.max_tokens)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "generation failed, using fallback");
                FALLBACK_REPLY.to_string()
            }
        };

        let (without_markers, directives) = postprocess::extract_actions(&raw);
        let response = postprocess::clean_technical_language(&without_markers);
        debug!(
            user_id = %request.user_id,
            %intent,
            directives = directives.len(),
            "turn post-processed"
        );

        let report = self
            .executor
            .execute(&request.user_id, session.id.as_deref(), &directives)
            .await;

        if let Some(session_id) = session.id.as_deref() {
            self.persist_turn(session_id, &request, intent, &response, &report.actions)
                .await;
        }

        self.spawn_learning(&request, intent);

        TurnOutcome {
            response,
            intent,
            actions: report.actions,
            created_memories: report.created_memories,
            session_id: session.id,
        }
    }

    fn render_prompt(&self, bundle: &cora_context::ContextBundle, text: &str) -> String {
        let context = format_context_for_prompt(bundle);
        if context.is_empty() {
            format!("{}\n\nUsuário: {text}", self.options.system_prompt)
        } else {
            format!(
                "{}\n\n{context}\n\nUsuário: {text}",
                self.options.system_prompt
            )
        }
    }

    /// Persist both sides of the turn. Failures here are logged, never
    /// fatal: the reply already exists and the user still gets it.
    async fn persist_turn(
        &self,
        session_id: &str,
        request: &TurnRequest,
        intent: Intent,
        response: &str,
        actions: &[ExecutedAction],
    ) {
        let mut user_msg = ConversationMessage::new(
            session_id,
            &request.user_id,
            MessageRole::User,
            &request.text,
            &request.source,
        );
        user_msg.intent = Some(intent.to_string());

        let mut assistant_msg = ConversationMessage::new(
            session_id,
            &request.user_id,
            MessageRole::Assistant,
            response,
            &request.source,
        );
        if !actions.is_empty() {
            match serde_json::to_string(actions) {
                Ok(json) => assistant_msg.actions_taken = Some(json),
                Err(e) => warn!(error = %e, "actions encode failed"),
            }
        }

        for msg in [&user_msg, &assistant_msg] {
            if let Err(e) = queries::insert_message(&self.db, msg).await {
                warn!(session_id, error = %e, "turn message persist failed");
            }
            if let Err(e) = queries::increment_message_count(&self.db, session_id).await {
                warn!(session_id, error = %e, "message count bump failed");
            }
        }
    }

    /// Fire-and-forget learner update. Never adds latency or errors to the
    /// user-facing path.
    fn spawn_learning(&self, request: &TurnRequest, intent: Intent) {
        let learner = Arc::clone(&self.learner);
        let user_id = request.user_id.clone();
        let text = request.text.clone();
        let intent = intent.to_string();
        tokio::spawn(async move {
            if let Err(e) = learner
                .observe_message(&user_id, &text, &intent, Utc::now())
                .await
            {
                warn!(user_id, error = %e, "pattern learning failed");
            }
        });
    }
}
