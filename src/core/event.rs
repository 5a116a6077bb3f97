// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event wrapper pairing a value with its logical timestamp.

use serde::{Deserialize, Serialize};

/// An event value together with the logical time (milliseconds) at which it
/// occurred. Timestamps are monotonic across a stream but need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord<T> {
    value: T,
    timestamp: i64,
}

impl<T> EventRecord<T> {
    pub fn new(value: T, timestamp: i64) -> Self {
        Self { value, timestamp }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
