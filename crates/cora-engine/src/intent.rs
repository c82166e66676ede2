// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic intent detection.
//!
//! Keyword rules over the lowercased message. No LLM pre-call, no network,
//! no latency; the detected intent feeds pattern learning and the persisted
//! turn record.

/// What the user seems to want from this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CreateTask,
    Reminder,
    Question,
    Finance,
    Health,
    Greeting,
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::CreateTask => write!(f, "create_task"),
            Intent::Reminder => write!(f, "reminder"),
            Intent::Question => write!(f, "question"),
            Intent::Finance => write!(f, "finance"),
            Intent::Health => write!(f, "health"),
            Intent::Greeting => write!(f, "greeting"),
            Intent::General => write!(f, "general"),
        }
    }
}

/// Greeting patterns (exact match after trimming, case-insensitive).
const GREETING_EXACT: &[&str] = &[
    "oi", "olá", "ola", "bom dia", "boa tarde", "boa noite", "e aí", "e ai",
    "hey", "hi", "hello", "opa", "fala", "tudo bem?", "tudo bem",
];

/// Task-creation indicators (contains, case-insensitive).
const TASK_INDICATORS: &[&str] = &[
    "preciso fazer", "preciso terminar", "preciso entregar", "tenho que",
    "anota aí", "anota ai", "adicionar tarefa", "nova tarefa", "criar tarefa",
    "to-do", "todo:",
];

/// Reminder indicators.
const REMINDER_INDICATORS: &[&str] = &[
    "me lembra", "me lembre", "lembrete", "não esquecer", "nao esquecer",
    "não me deixa esquecer", "remind me",
];

/// Finance indicators.
const FINANCE_INDICATORS: &[&str] = &[
    "gastei", "paguei", "recebi", "salário", "salario", "quanto gastei",
    "saldo", "orçamento", "orcamento", "fatura", "investimento",
];

/// Health indicators.
const HEALTH_INDICATORS: &[&str] = &[
    "treino", "treinei", "academia", "corrida", "corri", "dormi", "sono",
    "dieta", "médico", "medico", "consulta",
];

/// Question openers (prefix match).
const QUESTION_OPENERS: &[&str] = &[
    "qual", "quais", "quando", "onde", "como", "por que", "por quê", "quem",
    "quanto", "quanta", "o que", "será que", "sera que",
];

/// Whether `term` occurs in `text` bounded by non-word characters.
///
/// Bare `contains` would let "corri" fire inside "corrido". A boundary is
/// only required on a side where the term itself ends in a word character,
/// so terms like "todo:" keep matching mid-sentence.
fn contains_term(text: &str, term: &str) -> bool {
    let needs_left = term.chars().next().is_some_and(char::is_alphanumeric);
    let needs_right = term.chars().next_back().is_some_and(char::is_alphanumeric);

    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let begin = start + pos;
        let end = begin + term.len();
        let left_ok = !needs_left
            || text[..begin]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let right_ok = !needs_right
            || text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        start = end;
    }
    false
}

/// Whether the message opens with `term` as a whole word.
fn opens_with_term(text: &str, term: &str) -> bool {
    text.strip_prefix(term)
        .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_alphanumeric()))
}

/// Detect the intent of a message with zero-cost keyword rules.
///
/// Rule order is priority order: a message that both greets and asks still
/// counts as whatever the more specific rule says.
pub fn classify(message: &str) -> Intent {
    let lower = message.trim().to_lowercase();
    if lower.is_empty() {
        return Intent::General;
    }

    if GREETING_EXACT.iter().any(|g| lower == *g) {
        return Intent::Greeting;
    }
    if REMINDER_INDICATORS.iter().any(|k| contains_term(&lower, k)) {
        return Intent::Reminder;
    }
    if TASK_INDICATORS.iter().any(|k| contains_term(&lower, k)) {
        return Intent::CreateTask;
    }
    if FINANCE_INDICATORS.iter().any(|k| contains_term(&lower, k)) {
        return Intent::Finance;
    }
    if HEALTH_INDICATORS.iter().any(|k| contains_term(&lower, k)) {
        return Intent::Health;
    }
    if lower.ends_with('?') || QUESTION_OPENERS.iter().any(|q| opens_with_term(&lower, q)) {
        return Intent::Question;
    }
    Intent::General
}
