// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API implementation of the text provider.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
