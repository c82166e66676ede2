// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-source context assembly and deterministic prompt rendering.

pub mod aggregator;
pub mod bundle;
pub mod render;

pub use aggregator::{ContextAggregator, ContextOptions};
pub use bundle::ContextBundle;
pub use render::format_context_for_prompt;
