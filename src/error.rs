//! Error types for the analysis pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Spindle core error: {0}")]
    Core(#[from] spindle_core::Error),

    #[error("Region table error: {0}")]
    Table(#[from] spindle_polars::Error),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
