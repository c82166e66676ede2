// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental behavioral pattern learning.
//!
//! Each user message feeds time-of-day and topic counters; a sampled deep
//! pass classifies communication style. Confidence grows with sample count
//! and never decreases.

pub mod learner;
pub mod store;
pub mod types;

pub use learner::PatternLearner;
pub use store::PatternStore;
pub use types::{LearnedPattern, PatternData, PatternKind, confidence_for};
