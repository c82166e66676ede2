// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML configuration for the Cora assistant.
//!
//! Defaults < system file < XDG file < local file < `CORA_*` env vars.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CoraConfig;
