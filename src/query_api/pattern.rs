// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative pattern chains.
//!
//! A pattern is an ordered chain of named stages. Each stage carries a
//! conjunction of predicates, the continuity of the junction that opened it,
//! and a quantifier. An optional window bounds the elapsed time between the
//! first and last event of any match.
//!
//! ```ignore
//! let pattern = Pattern::begin("start")
//!     .when(|e: &Event| e.name == "start")
//!     .followed_by("middle")
//!     .when(|e: &Event| e.name == "middle")
//!     .one_or_more()
//!     .followed_by("end")
//!     .when(|e: &Event| e.name == "end")
//!     .within(10_000);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::error::{PatternFluxError, PatternFluxResult};
use crate::query_api::condition::{Condition, SimpleCondition, SubtypeCondition};
use crate::query_api::quantifier::{ConsumingStrategy, Quantifier, QuantifierMode};

/// One named position in a pattern chain.
pub struct Stage<T> {
    name: String,
    conditions: Vec<Arc<dyn Condition<T>>>,
    strategy: ConsumingStrategy,
    quantifier: Quantifier,
    // Builder misuse is recorded here and reported by validate(), in one
    // place, instead of panicking mid-chain.
    requantified: bool,
    inner_conflict: bool,
}

impl<T> Stage<T> {
    fn new(name: String, strategy: ConsumingStrategy) -> Self {
        Self {
            name,
            conditions: Vec::new(),
            strategy,
            quantifier: Quantifier::default(),
            requantified: false,
            inner_conflict: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Arc<dyn Condition<T>>] {
        &self.conditions
    }

    pub fn strategy(&self) -> ConsumingStrategy {
        self.strategy
    }

    pub fn quantifier(&self) -> &Quantifier {
        &self.quantifier
    }

    fn set_inner_strategy(&mut self, strategy: ConsumingStrategy) {
        if self.quantifier.inner_strategy != ConsumingStrategy::SkipTillNext
            && self.quantifier.inner_strategy != strategy
        {
            self.inner_conflict = true;
        }
        self.quantifier.inner_strategy = strategy;
    }
}

impl<T> Clone for Stage<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            conditions: self.conditions.clone(),
            strategy: self.strategy,
            quantifier: self.quantifier,
            requantified: self.requantified,
            inner_conflict: self.inner_conflict,
        }
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("conditions", &self.conditions.len())
            .field("strategy", &self.strategy)
            .field("quantifier", &self.quantifier)
            .finish()
    }
}

/// An ordered chain of stages with an optional time window.
///
/// Built fluently starting from [`Pattern::begin`]; every stage-modifying
/// call applies to the most recently opened stage.
pub struct Pattern<T> {
    stages: Vec<Stage<T>>,
    window_time: Option<i64>,
}

impl<T> Pattern<T> {
    /// Open a new pattern chain with its head stage. Nothing can precede
    /// the head.
    pub fn begin(name: impl Into<String>) -> Self {
        Self {
            stages: vec![Stage::new(name.into(), ConsumingStrategy::Strict)],
            window_time: None,
        }
    }

    /// Open the next stage with strict continuity: the event immediately
    /// following the previous stage's match must match this stage.
    pub fn next(mut self, name: impl Into<String>) -> Self {
        self.stages
            .push(Stage::new(name.into(), ConsumingStrategy::Strict));
        self
    }

    /// Open the next stage with skip-till-next continuity: non-matching
    /// events in between are skipped, the first match wins.
    pub fn followed_by(mut self, name: impl Into<String>) -> Self {
        self.stages
            .push(Stage::new(name.into(), ConsumingStrategy::SkipTillNext));
        self
    }

    /// Open the next stage with skip-till-any continuity: every matching
    /// event in between opens its own branch.
    pub fn followed_by_any(mut self, name: impl Into<String>) -> Self {
        self.stages
            .push(Stage::new(name.into(), ConsumingStrategy::SkipTillAny));
        self
    }

    /// Add a predicate to the current stage. Multiple predicates are ANDed.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        T: 'static,
    {
        self.when_condition(Arc::new(SimpleCondition::new(predicate)))
    }

    /// Add any [`Condition`] implementor to the current stage (ANDed).
    pub fn when_condition(mut self, condition: Arc<dyn Condition<T>>) -> Self {
        self.current().conditions.push(condition);
        self
    }

    /// Restrict the current stage to a refined shape of the event type.
    /// The guard is ANDed with the stage's other predicates.
    pub fn subtype<F>(mut self, guard: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        T: 'static,
    {
        self.current()
            .conditions
            .push(Arc::new(SubtypeCondition::new(guard)));
        self
    }

    /// Make the current stage optional.
    pub fn optional(mut self) -> Self {
        self.current().quantifier.optional = true;
        self
    }

    /// Require the current stage to match exactly `count` events.
    pub fn times(mut self, count: u32) -> Self {
        let stage = self.current();
        if stage.quantifier.mode != QuantifierMode::Single {
            stage.requantified = true;
        }
        stage.quantifier.mode = QuantifierMode::Times(count);
        self
    }

    /// Let the current stage match one or more events.
    pub fn one_or_more(mut self) -> Self {
        let stage = self.current();
        if stage.quantifier.mode != QuantifierMode::Single {
            stage.requantified = true;
        }
        stage.quantifier.mode = QuantifierMode::Looping;
        self
    }

    /// Require strict continuity inside the current quantified group.
    pub fn consecutive(mut self) -> Self {
        self.current().set_inner_strategy(ConsumingStrategy::Strict);
        self
    }

    /// Allow skip-till-any continuity inside the current quantified group.
    pub fn allow_combinations(mut self) -> Self {
        self.current()
            .set_inner_strategy(ConsumingStrategy::SkipTillAny);
        self
    }

    /// Bound the whole chain by a time window, in milliseconds.
    pub fn within(mut self, duration_ms: i64) -> Self {
        self.window_time = Some(duration_ms);
        self
    }

    pub fn stages(&self) -> &[Stage<T>] {
        &self.stages
    }

    pub fn window_time(&self) -> Option<i64> {
        self.window_time
    }

    /// Check chain-level constraints. Called by the compiler before any
    /// state is built.
    pub fn validate(&self) -> PatternFluxResult<()> {
        if let Some(window) = self.window_time {
            if window <= 0 {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "window must be positive, got {window}ms"
                )));
            }
        }

        for (idx, stage) in self.stages.iter().enumerate() {
            if stage.name.is_empty() {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "stage #{idx} has an empty name"
                )));
            }
            if self.stages[..idx].iter().any(|s| s.name == stage.name) {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "duplicate stage name '{}'",
                    stage.name
                )));
            }
            if stage.requantified {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "stage '{}' was quantified more than once",
                    stage.name
                )));
            }
            if stage.inner_conflict {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "stage '{}' has contradictory inner continuity (consecutive vs allow_combinations)",
                    stage.name
                )));
            }
            if stage.quantifier.inner_strategy != ConsumingStrategy::SkipTillNext
                && !stage.quantifier.is_quantified()
            {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "stage '{}' sets inner continuity but is not quantified",
                    stage.name
                )));
            }
            if let QuantifierMode::Times(0) = stage.quantifier.mode {
                return Err(PatternFluxError::invalid_pattern(format!(
                    "stage '{}' requires times(n) with n >= 1",
                    stage.name
                )));
            }
        }

        Ok(())
    }

    fn current(&mut self) -> &mut Stage<T> {
        // begin() guarantees at least one stage.
        self.stages.last_mut().expect("pattern chain is never empty")
    }
}

impl<T> Clone for Pattern<T> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
            window_time: self.window_time,
        }
    }
}

impl<T> fmt::Debug for Pattern<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("stages", &self.stages)
            .field("window_time", &self.window_time)
            .finish()
    }
}
