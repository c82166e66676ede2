// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental pattern learning from each user message.
//!
//! Runs after the reply is already produced. Callers wrap `observe_message`
//! in a spawned task and log failures; nothing here may surface an error to
//! the user-facing path.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use cora_core::{CoraError, TextProvider};
use cora_storage::{Database, queries};
use tracing::{debug, warn};

use crate::store::PatternStore;
use crate::types::PatternData;

/// Fixed topic taxonomy: topic name and the keywords that signal it.
const TOPIC_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "work",
        &[
            "trabalho", "reunião", "reuniao", "projeto", "cliente", "prazo", "relatório",
            "relatorio", "chefe", "meeting", "deadline",
        ],
    ),
    (
        "health",
        &[
            "saúde", "saude", "treino", "academia", "médico", "medico", "dieta", "sono",
            "exercício", "exercicio", "corrida",
        ],
    ),
    (
        "finance",
        &[
            "dinheiro", "gasto", "salário", "salario", "investimento", "conta", "orçamento",
            "orcamento", "pagar", "fatura",
        ],
    ),
    (
        "learning",
        &[
            "estudar", "estudo", "curso", "aprender", "livro", "leitura", "aula", "prova",
        ],
    ),
    (
        "personal",
        &[
            "família", "familia", "amigo", "amiga", "casa", "filho", "filha", "aniversário",
            "aniversario", "viagem",
        ],
    ),
    (
        "creative",
        &[
            "escrever", "música", "musica", "desenho", "arte", "ideia", "criar", "compor",
        ],
    ),
];

fn period_of_day(hour: u32) -> &'static str {
    if hour < 12 {
        "morning"
    } else if hour < 18 {
        "afternoon"
    } else {
        "evening"
    }
}

fn weekday_name(at: DateTime<Utc>) -> String {
    // chrono's English lowercase weekday, stable map keys.
    format!("{:?}", at.weekday()).to_lowercase()
}

/// Topics from the fixed taxonomy that the lowercased text mentions.
fn detect_topics(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TOPIC_TAXONOMY
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
        .collect()
}

/// Observes user messages and upserts behavioral patterns.
pub struct PatternLearner {
    store: PatternStore,
    db: Database,
    provider: Arc<dyn TextProvider>,
    deep_analysis_interval: i64,
}

impl PatternLearner {
    pub fn new(
        store: PatternStore,
        db: Database,
        provider: Arc<dyn TextProvider>,
        deep_analysis_interval: i64,
    ) -> Self {
        Self {
            store,
            db,
            provider,
            deep_analysis_interval,
        }
    }

    /// Learn from one user message.
    ///
    /// Observes the time-of-day pattern, any matching topic patterns, and on
    /// every `deep_analysis_interval`-th user message of the calendar day
    /// runs the heavier style classification. Deep-analysis failures are
    /// logged and swallowed here; persistence failures propagate so the
    /// spawning call site can log them.
    pub async fn observe_message(
        &self,
        user_id: &str,
        text: &str,
        intent: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CoraError> {
        self.observe_time(user_id, intent, at).await?;
        self.observe_topics(user_id, text, intent).await?;

        match queries::count_user_messages_on_day(
            &self.db,
            user_id,
            &at.format("%Y-%m-%d").to_string(),
        )
        .await
        {
            Ok(count)
                if count > 0
                    && self.deep_analysis_interval > 0
                    && count % self.deep_analysis_interval == 0 =>
            {
                if let Err(e) = self.deep_analysis(user_id).await {
                    warn!(user_id, error = %e, "deep analysis failed");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(user_id, error = %e, "day message count failed"),
        }
        Ok(())
    }

    async fn observe_time(
        &self,
        user_id: &str,
        intent: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CoraError> {
        let period = period_of_day(at.hour());
        let data = PatternData::TimePreference {
            hours: BTreeMap::from([(at.hour().to_string(), 1)]),
            weekdays: BTreeMap::from([(weekday_name(at), 1)]),
            intents: BTreeMap::from([(intent.to_string(), 1)]),
        };
        self.store
            .upsert_observation(user_id, period, None, data)
            .await
    }

    async fn observe_topics(
        &self,
        user_id: &str,
        text: &str,
        intent: &str,
    ) -> Result<(), CoraError> {
        for topic in detect_topics(text) {
            let data = PatternData::TopicInterest {
                mentions: 1,
                intents: BTreeMap::from([(intent.to_string(), 1)]),
            };
            self.store
                .upsert_observation(user_id, topic, None, data)
                .await?;
        }
        Ok(())
    }

    /// LLM classification of the user's communication style over the last
    /// messages of the day. Sampled, not per-message.
    async fn deep_analysis(&self, user_id: &str) -> Result<(), CoraError> {
        let messages =
            queries::get_recent_user_messages(&self.db, user_id, 20).await?;
        if messages.is_empty() {
            return Ok(());
        }
        let sample: Vec<String> = messages
            .iter()
            .map(|m| format!("- {}", m.content))
            .collect();
        let prompt = format!(
            "Analise as mensagens abaixo e classifique o estilo de comunicação \
             do usuário em poucas palavras (por exemplo: direto, detalhista, \
             informal). Responda apenas com a classificação.\n\n{}",
            sample.join("\n")
        );
        let style = self.provider.generate(&prompt, 0.3, 100).await?;
        let style = style.trim().to_string();
        if style.is_empty() {
            return Ok(());
        }
        debug!(user_id, %style, "communication style classified");
        self.store
            .upsert_observation(
                user_id,
                "estilo",
                Some("classificação periódica do estilo de comunicação"),
                PatternData::CommunicationStyle { style },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cora_core::types::{ConversationMessage, MessageRole};
    use cora_test_utils::MockProvider;
    use tempfile::tempdir;

    async fn setup(provider: MockProvider) -> (PatternLearner, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let learner = PatternLearner::new(
            PatternStore::new(db.clone()),
            db.clone(),
            Arc::new(provider),
            20,
        );
        (learner, db, dir)
    }

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn period_buckets_match_boundaries() {
        assert_eq!(period_of_day(0), "morning");
        assert_eq!(period_of_day(11), "morning");
        assert_eq!(period_of_day(12), "afternoon");
        assert_eq!(period_of_day(17), "afternoon");
        assert_eq!(period_of_day(18), "evening");
        assert_eq!(period_of_day(23), "evening");
    }

    #[test]
    fn topics_match_portuguese_keywords() {
        let topics = detect_topics("Preciso terminar o relatório e pagar a fatura");
        assert_eq!(topics, vec!["work", "finance"]);
        assert!(detect_topics("bom dia").is_empty());
    }

    #[tokio::test]
    async fn observation_creates_time_and_topic_patterns() {
        let (learner, db, _dir) = setup(MockProvider::new()).await;

        learner
            .observe_message("user-1", "Reunião com o cliente amanhã", "question", morning())
            .await
            .unwrap();

        let store = PatternStore::new(db);
        let patterns = store.list_active("user-1", 0.0).await.unwrap();
        let names: Vec<&str> = patterns.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"morning"));
        assert!(names.contains(&"work"));
    }

    #[tokio::test]
    async fn repeated_observations_accumulate_in_period_bucket() {
        let (learner, db, _dir) = setup(MockProvider::new()).await;

        for _ in 0..3 {
            learner
                .observe_message("user-1", "bom dia", "greeting", morning())
                .await
                .unwrap();
        }

        let store = PatternStore::new(db);
        let patterns = store.list_active("user-1", 0.0).await.unwrap();
        let morning_pattern = patterns.iter().find(|p| p.name == "morning").unwrap();
        assert_eq!(morning_pattern.sample_count, 3);
        match &morning_pattern.data {
            PatternData::TimePreference { hours, intents, .. } => {
                assert_eq!(hours.get("9"), Some(&3));
                assert_eq!(intents.get("greeting"), Some(&3));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn twentieth_daily_message_triggers_style_classification() {
        let provider = MockProvider::with_responses(vec!["direto e objetivo".to_string()]);
        let (learner, db, _dir) = setup(provider).await;

        // 19 prior user messages today; the observed one is the 20th.
        for i in 0..19 {
            let mut msg = ConversationMessage::new(
                "sess-1",
                "user-1",
                MessageRole::User,
                format!("mensagem {i}"),
                "cli",
            );
            msg.created_at = format!("2026-03-02T08:{:02}:00+00:00", i);
            queries::insert_message(&db, &msg).await.unwrap();
        }
        let mut msg =
            ConversationMessage::new("sess-1", "user-1", MessageRole::User, "oi", "cli");
        msg.created_at = "2026-03-02T09:00:00+00:00".to_string();
        queries::insert_message(&db, &msg).await.unwrap();

        learner
            .observe_message("user-1", "oi", "greeting", morning())
            .await
            .unwrap();

        let store = PatternStore::new(db);
        let patterns = store.list_active("user-1", 0.0).await.unwrap();
        let style = patterns
            .iter()
            .find(|p| p.name == "estilo")
            .expect("style pattern present");
        match &style.data {
            PatternData::CommunicationStyle { style } => {
                assert_eq!(style, "direto e objetivo");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn style_classification_failure_is_swallowed() {
        let provider = MockProvider::failing();
        let (learner, db, _dir) = setup(provider).await;

        let msg = ConversationMessage::new("sess-1", "user-1", MessageRole::User, "oi", "cli");
        for i in 0..20 {
            let mut m = msg.clone();
            m.id = format!("msg-{i}");
            m.created_at = "2026-03-02T09:00:00+00:00".to_string();
            queries::insert_message(&db, &m).await.unwrap();
        }

        // Provider fails; observe_message still succeeds.
        learner
            .observe_message("user-1", "oi", "greeting", morning())
            .await
            .unwrap();
    }
}
