// SPDX-License-Identifier: MIT OR Apache-2.0

//! Predicates attached to pattern stages.
//!
//! Conditions are opaque, pure predicates over event values. The engine
//! never inspects or reorders them; it only evaluates them. A condition may
//! fail, which aborts the current event's processing without touching
//! runtime state.

use std::fmt;
use std::sync::Arc;

/// Error type surfaced by failing user predicates.
pub type ConditionError = Box<dyn std::error::Error + Send + Sync>;

/// A predicate over event values.
///
/// Implementations must be pure: the same event must always yield the same
/// answer, with no side effects visible to the engine.
pub trait Condition<T>: Send + Sync {
    fn filter(&self, event: &T) -> Result<bool, ConditionError>;
}

/// Condition built from an infallible closure. The common case.
pub struct SimpleCondition<F> {
    predicate: F,
}

impl<F> SimpleCondition<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<T, F> Condition<T> for SimpleCondition<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn filter(&self, event: &T) -> Result<bool, ConditionError> {
        Ok((self.predicate)(event))
    }
}

/// Typed guard for streams carrying more than one shape of event.
///
/// Rust has no subtype relation between event values, so the refinement is
/// expressed as a guard closure: the condition holds when the event belongs
/// to the refined shape (for example, matches the enum variant the stage is
/// interested in).
pub struct SubtypeCondition<F> {
    guard: F,
}

impl<F> SubtypeCondition<F> {
    pub fn new(guard: F) -> Self {
        Self { guard }
    }
}

impl<T, F> Condition<T> for SubtypeCondition<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn filter(&self, event: &T) -> Result<bool, ConditionError> {
        Ok((self.guard)(event))
    }
}

/// Conjunction of two conditions. Short-circuits on the left side.
pub struct AndCondition<T> {
    left: Arc<dyn Condition<T>>,
    right: Arc<dyn Condition<T>>,
}

impl<T> AndCondition<T> {
    pub fn new(left: Arc<dyn Condition<T>>, right: Arc<dyn Condition<T>>) -> Self {
        Self { left, right }
    }
}

impl<T> Condition<T> for AndCondition<T> {
    fn filter(&self, event: &T) -> Result<bool, ConditionError> {
        Ok(self.left.filter(event)? && self.right.filter(event)?)
    }
}

/// Negation of a condition. Used by the compiler to guard IGNORE edges.
pub struct NotCondition<T> {
    inner: Arc<dyn Condition<T>>,
}

impl<T> NotCondition<T> {
    pub fn new(inner: Arc<dyn Condition<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Condition<T> for NotCondition<T> {
    fn filter(&self, event: &T) -> Result<bool, ConditionError> {
        Ok(!self.inner.filter(event)?)
    }
}

/// Condition that accepts every event.
pub struct TrueCondition;

impl<T> Condition<T> for TrueCondition {
    fn filter(&self, _event: &T) -> Result<bool, ConditionError> {
        Ok(true)
    }
}

impl<T> fmt::Debug for dyn Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<condition>")
    }
}

/// Fold a stage's conditions into a single conjunction.
///
/// Returns a [`TrueCondition`] when the stage carries no predicate.
pub(crate) fn conjoin<T: 'static>(conditions: &[Arc<dyn Condition<T>>]) -> Arc<dyn Condition<T>> {
    match conditions.len() {
        0 => Arc::new(TrueCondition),
        1 => conditions[0].clone(),
        _ => {
            let mut acc = conditions[0].clone();
            for cond in &conditions[1..] {
                acc = Arc::new(AndCondition::new(acc, cond.clone()));
            }
            acc
        }
    }
}
