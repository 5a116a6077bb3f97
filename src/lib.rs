// SPDX-License-Identifier: MIT OR Apache-2.0

//! PatternFlux — a complex event processing core.
//!
//! Declarative patterns over typed event streams are compiled into a
//! non-deterministic finite automaton with TAKE/IGNORE/PROCEED edge
//! semantics; the runtime advances the automaton one timestamped event at a
//! time and emits **all** maximal matches, sharing match prefixes through a
//! version-labelled buffer DAG. Patterns may carry a time window, in which
//! case expired partial matches can be reported as timeouts.
//!
//! ```ignore
//! use patternflux::{NfaCompiler, Pattern};
//!
//! let pattern = Pattern::begin("start")
//!     .when(|e: &Login| e.failed)
//!     .followed_by("alarm")
//!     .when(|e: &Login| e.failed)
//!     .times(3)
//!     .within(60_000);
//!
//! let mut nfa = NfaCompiler::compile(&pattern, false)?;
//! for record in stream {
//!     let result = nfa.process(record.value(), record.timestamp())?;
//!     for sequence in result.matches {
//!         // stage name -> events taken at that stage
//!     }
//! }
//! ```
//!
//! The runtime is single-threaded and cooperative: one instance per key,
//! callers serialize `process` invocations, and events must arrive in
//! non-decreasing timestamp order.

pub mod core;
pub mod query_api;

pub use crate::core::config::NfaConfig;
pub use crate::core::error::{PatternFluxError, PatternFluxResult};
pub use crate::core::event::EventRecord;
pub use crate::core::nfa::{
    DeweyNumber, Nfa, NfaCompiler, NfaSnapshot, PatternMatch, ProcessResult,
};
pub use crate::core::persistence::StateHolder;
pub use crate::query_api::condition::{
    Condition, ConditionError, SimpleCondition, SubtypeCondition,
};
pub use crate::query_api::pattern::Pattern;
pub use crate::query_api::quantifier::ConsumingStrategy;
