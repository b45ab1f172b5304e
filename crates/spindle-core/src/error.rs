//! Error types for spindle statistics
//!
//! Provides a unified error type for all spindle-stats crates.

use thiserror::Error;

/// Core error type for spindle analysis operations
#[derive(Error, Debug)]
pub enum Error {
    /// Interval whose end does not come after its start
    #[error("Invalid interval at index {index}: start {start}, end {end}")]
    InvalidInterval { index: usize, start: f64, end: f64 },

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Threading or parallelization error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Cache-related error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error (for cache persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (for cache persistence)
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a malformed interval
    pub fn invalid_interval(index: usize, start: f64, end: f64) -> Self {
        Self::InvalidInterval { index, start, end }
    }

    /// Create an error for invalid probability
    pub fn invalid_probability(name: &str, p: f64) -> Self {
        Self::InvalidParameter(format!("{name} {p} must be in [0, 1]"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }
}
