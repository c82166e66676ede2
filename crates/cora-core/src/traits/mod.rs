// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits implemented at process edges.

pub mod provider;

pub use provider::TextProvider;
