//! Error types for Chetana

use thiserror::Error;

/// Chetana error type
///
/// Only the crate edges (config loading, name parsing, the motion
/// controller seam) produce these. Control-path operations log and absorb
/// them instead of returning them.
#[derive(Error, Debug)]
pub enum ChetanaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Motion controller error: {0}")]
    Motion(String),

    #[error("Unknown behavior: {0}")]
    InvalidBehavior(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl From<toml::de::Error> for ChetanaError {
    fn from(e: toml::de::Error) -> Self {
        ChetanaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChetanaError>;
