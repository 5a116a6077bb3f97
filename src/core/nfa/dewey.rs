// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical version numbers for shared-buffer edges.
//!
//! Sibling branches created by skip-till-any continuity or quantifier
//! unrolling share predecessor entries in the buffer. A flat counter cannot
//! tell their paths apart; a Dewey number (`1`, `1.0`, `1.0.1`, ...) can:
//! each stage transition appends a digit, each sibling bumps the last one.
//! Sequence extraction follows exactly the edges whose version is
//! compatible with the extracting branch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-empty, dot-separated hierarchical version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeweyNumber {
    digits: Vec<u32>,
}

impl DeweyNumber {
    /// Single-digit version, the root of a lineage.
    pub fn new(start: u32) -> Self {
        Self {
            digits: vec![start],
        }
    }

    /// Copy with the last digit increased by `amount`.
    pub fn increase(&self, amount: u32) -> Self {
        let mut digits = self.digits.clone();
        // A fresh DeweyNumber is never empty and stays that way.
        *digits.last_mut().expect("dewey number is never empty") += amount;
        Self { digits }
    }

    /// Copy with a new `0` digit appended, entering the next stage.
    pub fn add_stage(&self) -> Self {
        let mut digits = self.digits.clone();
        digits.push(0);
        Self { digits }
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Whether `self` belongs to the lineage labelled by `other`.
    ///
    /// True when `other` is a strict prefix of `self`, or when both have the
    /// same length, share every digit but the last, and `self`'s last digit
    /// is at least `other`'s.
    pub fn is_compatible_with(&self, other: &DeweyNumber) -> bool {
        if self.len() > other.len() {
            self.digits[..other.len()] == other.digits[..]
        } else if self.len() == other.len() {
            let last = self.len() - 1;
            self.digits[..last] == other.digits[..last] && self.digits[last] >= other.digits[last]
        } else {
            false
        }
    }
}

impl fmt::Display for DeweyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for digit in &self.digits {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{digit}")?;
            first = false;
        }
        Ok(())
    }
}
