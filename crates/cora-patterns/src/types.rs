// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learned-pattern types.
//!
//! `pattern_data` is stored as JSON, but in memory it is a tagged union keyed
//! by the pattern type, one fixed-field schema per variant. Encoding and
//! decoding happen only at the persistence boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Confidence never exceeds this, no matter how many samples accumulate.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Confidence for a pattern with `sample_count` observations.
///
/// Starts at 0.31 on the first observation and grows 0.01 per sample.
pub fn confidence_for(sample_count: i64) -> f64 {
    (0.3 + sample_count as f64 * 0.01).min(MAX_CONFIDENCE)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    TimePreference,
    TaskCategory,
    CommunicationStyle,
    PriorityTendency,
    ProductivityCycle,
    TopicInterest,
    ResponsePreference,
    Workflow,
}

/// Structured payload of a learned pattern, one schema per kind.
///
/// Counter maps use `BTreeMap` so the JSON encoding is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternData {
    /// When in the day the user tends to act, and with what intent.
    ///
    /// Hour keys are decimal strings ("0".."23"): the internally tagged
    /// representation buffers content through `serde_json::Value`, which only
    /// carries string map keys, so integer keys would fail to read back.
    TimePreference {
        hours: BTreeMap<String, u64>,
        weekdays: BTreeMap<String, u64>,
        intents: BTreeMap<String, u64>,
    },
    /// How often a topic comes up, split by intent.
    TopicInterest {
        mentions: u64,
        intents: BTreeMap<String, u64>,
    },
    /// Free-text style classification from the deep-analysis pass.
    CommunicationStyle { style: String },
    TaskCategory { counts: BTreeMap<String, u64> },
    PriorityTendency { counts: BTreeMap<String, u64> },
    ProductivityCycle { periods: BTreeMap<String, u64> },
    ResponsePreference { counts: BTreeMap<String, u64> },
    Workflow { steps: Vec<String>, occurrences: u64 },
}

fn merge_counts<K: Ord + Clone>(into: &mut BTreeMap<K, u64>, from: &BTreeMap<K, u64>) {
    for (key, count) in from {
        *into.entry(key.clone()).or_insert(0) += count;
    }
}

impl PatternData {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> PatternKind {
        match self {
            PatternData::TimePreference { .. } => PatternKind::TimePreference,
            PatternData::TopicInterest { .. } => PatternKind::TopicInterest,
            PatternData::CommunicationStyle { .. } => PatternKind::CommunicationStyle,
            PatternData::TaskCategory { .. } => PatternKind::TaskCategory,
            PatternData::PriorityTendency { .. } => PatternKind::PriorityTendency,
            PatternData::ProductivityCycle { .. } => PatternKind::ProductivityCycle,
            PatternData::ResponsePreference { .. } => PatternKind::ResponsePreference,
            PatternData::Workflow { .. } => PatternKind::Workflow,
        }
    }

    /// Merge one more observation into an existing payload.
    ///
    /// Counter variants sum; `CommunicationStyle` takes the newest
    /// classification. Mismatched kinds leave `self` unchanged (the upsert
    /// key makes that unreachable in practice).
    pub fn merge(&mut self, incoming: &PatternData) {
        match (self, incoming) {
            (
                PatternData::TimePreference { hours, weekdays, intents },
                PatternData::TimePreference {
                    hours: h2,
                    weekdays: w2,
                    intents: i2,
                },
            ) => {
                merge_counts(hours, h2);
                merge_counts(weekdays, w2);
                merge_counts(intents, i2);
            }
            (
                PatternData::TopicInterest { mentions, intents },
                PatternData::TopicInterest {
                    mentions: m2,
                    intents: i2,
                },
            ) => {
                *mentions += m2;
                merge_counts(intents, i2);
            }
            (
                PatternData::CommunicationStyle { style },
                PatternData::CommunicationStyle { style: s2 },
            ) => {
                *style = s2.clone();
            }
            (
                PatternData::TaskCategory { counts },
                PatternData::TaskCategory { counts: c2 },
            ) => merge_counts(counts, c2),
            (
                PatternData::PriorityTendency { counts },
                PatternData::PriorityTendency { counts: c2 },
            ) => merge_counts(counts, c2),
            (
                PatternData::ProductivityCycle { periods },
                PatternData::ProductivityCycle { periods: p2 },
            ) => merge_counts(periods, p2),
            (
                PatternData::ResponsePreference { counts },
                PatternData::ResponsePreference { counts: c2 },
            ) => merge_counts(counts, c2),
            (
                PatternData::Workflow { steps, occurrences },
                PatternData::Workflow {
                    steps: s2,
                    occurrences: o2,
                },
            ) => {
                *steps = s2.clone();
                *occurrences += o2;
            }
            _ => {}
        }
    }
}

/// A learned pattern as stored, payload already decoded.
#[derive(Debug, Clone)]
pub struct LearnedPattern {
    pub id: String,
    pub user_id: String,
    pub kind: PatternKind,
    pub name: String,
    pub description: Option<String>,
    pub data: PatternData,
    pub confidence: f64,
    pub sample_count: i64,
    pub is_active: bool,
    pub updated_at: String,
}
