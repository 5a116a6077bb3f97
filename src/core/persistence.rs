// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-level state persistence.
//!
//! The engine does not persist anything itself; a surrounding system
//! collects the bytes of every registered holder at checkpoint time and
//! hands them back on recovery. The format is the JSON encoding of
//! [`NfaSnapshot`](crate::core::nfa::NfaSnapshot), which round-trips
//! bit-identically.

use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::PatternFluxResult;
use crate::core::nfa::Nfa;

/// A component whose mutable state can be captured and restored as bytes.
pub trait StateHolder {
    /// Serialize the current state.
    fn snapshot_state(&self) -> PatternFluxResult<Vec<u8>>;

    /// Replace the current state with a previously captured one.
    fn restore_state(&mut self, bytes: &[u8]) -> PatternFluxResult<()>;
}

impl<T> StateHolder for Nfa<T>
where
    T: Clone + Eq + Hash + Serialize + DeserializeOwned,
{
    fn snapshot_state(&self) -> PatternFluxResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.snapshot())?)
    }

    fn restore_state(&mut self, bytes: &[u8]) -> PatternFluxResult<()> {
        let snapshot = serde_json::from_slice(bytes)?;
        self.restore(snapshot)
    }
}
