// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cora.toml` > `~/.config/cora/cora.toml` >
//! `/etc/cora/cora.toml` with environment variable overrides via the `CORA_`
//! prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CoraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cora/cora.toml` (system-wide)
/// 3. `~/.config/cora/cora.toml` (user XDG config)
/// 4. `./cora.toml` (local directory)
/// 5. `CORA_*` environment variables
pub fn load_config() -> Result<CoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CoraConfig::default()))
        .merge(Toml::file("/etc/cora/cora.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cora/cora.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cora.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CoraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CoraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CORA_PROVIDER_API_KEY` must map to
/// `provider.api_key`, not `provider.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CORA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("provider_", "provider.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("context_", "context.", 1)
            .replacen("session_", "session.", 1)
            .replacen("patterns_", "patterns.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "cora");
        assert_eq!(config.session.max_age_hours, 6);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [agent]
            name = "assistente"

            [session]
            max_age_hours = 12

            [context]
            max_memories = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.name, "assistente");
        assert_eq!(config.session.max_age_hours, 12);
        assert_eq!(config.context.max_memories, 4);
        // Untouched sections keep defaults.
        assert_eq!(config.patterns.deep_analysis_interval, 20);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [agent]
            nmae = "typo"
            "#,
        );
        assert!(result.is_err(), "unknown key should fail extraction");
    }

    #[test]
    fn load_from_path_missing_file_uses_defaults() {
        let config =
            load_config_from_path(Path::new("/nonexistent/cora.toml")).unwrap();
        assert_eq!(config.agent.name, "cora");
    }
}
