// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cora assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Cora configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoraConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Text-generation provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Context aggregation settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Conversation session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Behavioral pattern learning settings.
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt preamble prepended to every rendered context.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "cora".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Text-generation provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider API key. `None` requires an environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for reply generation.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for reply generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cora").join("cora.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "cora.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Context aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Maximum memories returned by relevance search per message.
    #[serde(default = "default_max_memories")]
    pub max_memories: usize,

    /// Dialogue tail length included in the context bundle.
    #[serde(default = "default_recent_messages")]
    pub recent_messages: usize,

    /// Days ahead covered by the upcoming-events slice.
    #[serde(default = "default_event_window_days")]
    pub event_window_days: i64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_memories: default_max_memories(),
            recent_messages: default_recent_messages(),
            event_window_days: default_event_window_days(),
        }
    }
}

fn default_max_memories() -> usize {
    10
}

fn default_recent_messages() -> usize {
    5
}

fn default_event_window_days() -> i64 {
    7
}

/// Conversation session lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sessions older than this are closed and replaced on the next message.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,

    /// Closing sessions with more messages than this get a generated summary.
    #[serde(default = "default_summary_min_messages")]
    pub summary_min_messages: usize,

    /// Token cap for the session-summary generation call.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            summary_min_messages: default_summary_min_messages(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

fn default_max_age_hours() -> i64 {
    6
}

fn default_summary_min_messages() -> usize {
    3
}

fn default_summary_max_tokens() -> u32 {
    200
}

/// Behavioral pattern learning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PatternsConfig {
    /// Patterns below this confidence are excluded from context bundles.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Every Nth user message in a calendar day triggers the deep
    /// communication-style analysis pass.
    #[serde(default = "default_deep_analysis_interval")]
    pub deep_analysis_interval: i64,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            deep_analysis_interval: default_deep_analysis_interval(),
        }
    }
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_deep_analysis_interval() -> i64 {
    20
}
