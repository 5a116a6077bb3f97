// SPDX-License-Identifier: MIT OR Apache-2.0

//! PatternFlux Core Error Types
//!
//! Error handling for pattern compilation and NFA runtime operations.

use thiserror::Error;

/// Result type for PatternFlux operations
pub type PatternFluxResult<T> = Result<T, PatternFluxError>;

/// PatternFlux error types
///
/// User-facing failures only. Internal consistency violations (shared-buffer
/// corruption, version regressions) indicate engine bugs and panic instead.
#[derive(Error, Debug)]
pub enum PatternFluxError {
    #[error("invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("condition failed at stage '{stage}': {source}")]
    ConditionError {
        stage: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("time regression: timestamp {timestamp} is earlier than last accepted timestamp {last_timestamp}")]
    TimeRegression { timestamp: i64, last_timestamp: i64 },

    #[error("computation state ceiling exceeded: {projected} live branches, configured limit {limit}")]
    CapacityExceeded { projected: usize, limit: usize },

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

// Custom error creation helpers
impl PatternFluxError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            message: message.into(),
        }
    }

    /// Create a condition error for the given stage
    pub fn condition_error(
        stage: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::ConditionError {
            stage: stage.into(),
            source,
        }
    }

    /// Create a time regression error
    pub fn time_regression(timestamp: i64, last_timestamp: i64) -> Self {
        Self::TimeRegression {
            timestamp,
            last_timestamp,
        }
    }

    /// Create a capacity exceeded error
    pub fn capacity_exceeded(projected: usize, limit: usize) -> Self {
        Self::CapacityExceeded { projected, limit }
    }

    /// Create a generic error from a string
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
