// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime configuration for a compiled NFA.

use serde::{Deserialize, Serialize};

/// Default ceiling on live computation states.
pub const DEFAULT_MAX_COMPUTATION_STATES: usize = 20_000;

/// Configuration knobs for the NFA runtime.
///
/// Skip-till-any continuity and quantifier unrolling can multiply live
/// branches per event. The ceiling turns runaway branching into a loud
/// [`CapacityExceeded`](crate::core::error::PatternFluxError::CapacityExceeded)
/// error instead of unbounded memory growth; no matches are ever dropped
/// silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfaConfig {
    /// Maximum number of live computation states after any single event.
    pub max_computation_states: usize,
}

impl Default for NfaConfig {
    fn default() -> Self {
        Self {
            max_computation_states: DEFAULT_MAX_COMPUTATION_STATES,
        }
    }
}

impl NfaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the live computation state ceiling.
    pub fn with_max_computation_states(mut self, max: usize) -> Self {
        self.max_computation_states = max;
        self
    }
}
