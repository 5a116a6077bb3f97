// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing declarative API: pattern chains, conditions, quantifiers.

pub mod condition;
pub mod pattern;
pub mod quantifier;

pub use condition::{
    AndCondition, Condition, ConditionError, NotCondition, SimpleCondition, SubtypeCondition,
    TrueCondition,
};
pub use pattern::{Pattern, Stage};
pub use quantifier::{ConsumingStrategy, Quantifier, QuantifierMode};
