// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic textual rendering of a context bundle.
//!
//! Pure function of the bundle: identical bundles render byte-identical
//! text. Section order is fixed; empty slices render nothing.

use std::fmt::Write;

use crate::bundle::ContextBundle;

fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{sign}R$ {},{:02}", abs / 100, abs % 100)
}

/// Render the bundle as the context block of the system prompt.
pub fn format_context_for_prompt(bundle: &ContextBundle) -> String {
    let mut out = String::new();

    if let Some(profile) = &bundle.profile {
        out.push_str("## Sobre o usuário\n");
        let _ = writeln!(out, "Nome: {}", profile.display_name);
        if let Some(timezone) = &profile.timezone {
            let _ = writeln!(out, "Fuso horário: {timezone}");
        }
        if let Some(bio) = &profile.bio {
            let _ = writeln!(out, "{bio}");
        }
        out.push('\n');
    }

    if let Some(mode) = &bundle.mode {
        out.push_str("## Modo ativo\n");
        match &mode.description {
            Some(description) => {
                let _ = writeln!(out, "{}: {description}", mode.name);
            }
            None => {
                let _ = writeln!(out, "{}", mode.name);
            }
        }
        out.push('\n');
    }

    if !bundle.memories.is_empty() {
        out.push_str("## Memórias relevantes\n");
        for scored in &bundle.memories {
            let _ = writeln!(
                out,
                "- [{}] {}",
                scored.memory.category, scored.memory.content
            );
        }
        out.push('\n');
    }

    if !bundle.patterns.is_empty() {
        out.push_str("## Padrões observados\n");
        for pattern in &bundle.patterns {
            let _ = writeln!(
                out,
                "- {} \"{}\" (confiança {:.2})",
                pattern.kind, pattern.name, pattern.confidence
            );
        }
        out.push('\n');
    }

    if !bundle.tasks.is_empty() {
        out.push_str("## Tarefas pendentes\n");
        for task in &bundle.tasks {
            match &task.due_date {
                Some(due) => {
                    let _ = writeln!(out, "- {} (prazo: {due})", task.title);
                }
                None => {
                    let _ = writeln!(out, "- {}", task.title);
                }
            }
        }
        out.push('\n');
    }

    if !bundle.events.is_empty() {
        out.push_str("## Próximos eventos\n");
        for event in &bundle.events {
            let _ = writeln!(out, "- {}: {}", event.starts_at, event.title);
        }
        out.push('\n');
    }

    if !bundle.goals.is_empty() {
        out.push_str("## Metas ativas\n");
        for goal in &bundle.goals {
            let _ = writeln!(out, "- {} (progresso: {}%)", goal.title, goal.progress);
        }
        out.push('\n');
    }

    if let Some(finance) = &bundle.finance {
        out.push_str("## Finanças do mês\n");
        let _ = writeln!(
            out,
            "Receitas: {} | Despesas: {} | Saldo: {}",
            format_brl(finance.income_cents),
            format_brl(finance.expense_cents),
            format_brl(finance.balance_cents())
        );
        out.push('\n');
    }

    if !bundle.recent_messages.is_empty() {
        out.push_str("## Últimas mensagens\n");
        for message in &bundle.recent_messages {
            let _ = writeln!(out, "{}: {}", message.role, message.content);
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}
