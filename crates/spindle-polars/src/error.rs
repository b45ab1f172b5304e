//! Error types for spindle-polars

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Spindle core error: {0}")]
    Core(#[from] spindle_core::Error),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch in column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    /// The oracle failed to fit the model
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The oracle's optimizer did not converge
    #[error("Model did not converge: {0}")]
    NonConvergence(String),

    /// The oracle returned a fit that cannot be used as-is
    #[error("Incomplete fit: {0}")]
    IncompleteFit(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
