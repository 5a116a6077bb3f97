// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repetition and continuity modifiers for pattern stages.

use serde::{Deserialize, Serialize};

/// How events between matches are treated.
///
/// Applies at two levels: between stages (the junction opened by
/// `next`/`followed_by`/`followed_by_any`) and inside a quantified group
/// (set with `consecutive`/`allow_combinations`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumingStrategy {
    /// The very next event must match, otherwise the branch dies.
    Strict,
    /// Non-matching events are skipped; the first match wins.
    SkipTillNext,
    /// Non-matching and matching events may both be skipped; every match
    /// opens its own branch.
    SkipTillAny,
}

/// Repetition shape of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantifierMode {
    /// Exactly one event (the default).
    Single,
    /// Exactly `n` events.
    Times(u32),
    /// One or more events (a self-looping group).
    Looping,
}

/// Full quantifier for a stage: repetition mode, optionality, and the
/// continuity applied inside the quantified group.
///
/// `Looping` + `optional` is "zero or more"; `Times(n)` + `optional` is
/// "exactly n or none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantifier {
    pub mode: QuantifierMode,
    pub optional: bool,
    pub inner_strategy: ConsumingStrategy,
}

impl Default for Quantifier {
    fn default() -> Self {
        Self {
            mode: QuantifierMode::Single,
            optional: false,
            inner_strategy: ConsumingStrategy::SkipTillNext,
        }
    }
}

impl Quantifier {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn times(count: u32) -> Self {
        Self {
            mode: QuantifierMode::Times(count),
            ..Self::default()
        }
    }

    pub fn one_or_more() -> Self {
        Self {
            mode: QuantifierMode::Looping,
            ..Self::default()
        }
    }

    /// Whether the stage repeats (times or looping).
    pub fn is_quantified(&self) -> bool {
        !matches!(self.mode, QuantifierMode::Single)
    }
}
