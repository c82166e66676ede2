// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directive extraction and scrubbing of generated text.
//!
//! The model embeds side-effect requests as `[AÇÃO: <tipo> | <detalhes>]`
//! markers. A small explicit scanner walks the text instead of one
//! monolithic regex, so multi-directive and adjacent-marker cases stay
//! explicit. Malformed markers pass through untouched.

use std::sync::LazyLock;

use cora_core::types::ActionDirective;
use regex::Regex;

/// Start marker of an embedded directive. Multibyte: always track byte
/// offsets from `str::find`, never char counts.
const MARKER: &str = "[AÇÃO:";

/// Parse every well-formed directive out of `text`.
///
/// Returns the text with all matched spans removed (trimmed) and the
/// directives in order of appearance. The type is lower-cased, details are
/// trimmed; the first `|` splits type from details, details end at the first
/// `]`. A marker missing its `|` or `]` is malformed and stays in the text.
pub fn extract_actions(text: &str) -> (String, Vec<ActionDirective>) {
    let mut directives = Vec::new();
    let mut clean = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(MARKER) {
        let after_marker = start + MARKER.len();
        let body = &rest[after_marker..];
        let parsed = body.find(']').and_then(|close| {
            let span = &body[..close];
            span.find('|').map(|pipe| {
                let kind = span[..pipe].trim().to_lowercase();
                let details = span[pipe + 1..].trim().to_string();
                (close, kind, details)
            })
        });

        match parsed {
            Some((close, kind, details)) if !kind.is_empty() => {
                directives.push(ActionDirective { kind, details });
                clean.push_str(&rest[..start]);
                rest = &rest[after_marker + close + 1..];
            }
            _ => {
                // Malformed: emit through the marker and keep scanning.
                clean.push_str(&rest[..after_marker]);
                rest = &rest[after_marker..];
            }
        }
    }
    clean.push_str(rest);

    (clean.trim().to_string(), directives)
}

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});
static ID_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(?\bid:\s*[A-Za-z0-9_-]+\)?").unwrap());
static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Internal-status vocabulary replaced with plain words.
const PHRASE_TABLE: &[(&str, &str)] = &[
    ("registrado no banco de dados", "anotado"),
    ("salvo no banco de dados", "anotado"),
    ("persistido com sucesso", "anotado"),
    ("processando sua solicitação", "um momento"),
    ("executando a ação", "fazendo isso"),
    ("registro criado", "anotado"),
];

/// Scrub technical artifacts out of user-facing text.
///
/// ID stripping runs before phrase substitution so a phrase never matches
/// inside an identifier; blank-line and space collapsing run last.
pub fn clean_technical_language(text: &str) -> String {
    let text = UUID_RE.replace_all(text, "");
    let text = ID_REF_RE.replace_all(&text, "");

    let mut text = text.into_owned();
    for (from, to) in PHRASE_TABLE {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }

    let text = BLANK_RE.replace_all(&text, "\n\n");
    let text = SPACES_RE.replace_all(&text, " ");
    text.trim().to_string()
}
