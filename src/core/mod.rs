// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime side of the engine: errors, configuration, the automaton and
//! its shared buffer, and state persistence.

pub mod config;
pub mod error;
pub mod event;
pub mod nfa;
pub mod persistence;

pub use config::NfaConfig;
pub use error::{PatternFluxError, PatternFluxResult};
pub use event::EventRecord;
pub use persistence::StateHolder;
