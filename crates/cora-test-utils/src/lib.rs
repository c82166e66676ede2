// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cora integration tests.
//!
//! Provides a deterministic mock text provider so tests run fast and without
//! external API calls.

pub mod mock_provider;

pub use mock_provider::MockProvider;
