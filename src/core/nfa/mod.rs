// SPDX-License-Identifier: MIT OR Apache-2.0

//! The automaton: compilation, versioning, shared storage, and the runtime.

pub mod compiler;
pub mod dewey;
pub mod runtime;
pub mod shared_buffer;
pub mod state;

// Re-export core types
pub use compiler::{NfaCompiler, ENDING_STATE_NAME};
pub use dewey::DeweyNumber;
pub use runtime::{ComputationState, Nfa, NfaSnapshot, PatternMatch, ProcessResult};
pub use shared_buffer::{EntryId, SharedBuffer};
pub use state::{State, StateId, StateType, TransitionAction};
