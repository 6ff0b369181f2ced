//! Error types for Strudel

use std::io;
use thiserror::Error;

/// Main error type for Strudel
#[derive(Error, Debug)]
pub enum StrudelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Row {index} is out of range (have {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Strudel operations
pub type Result<T> = std::result::Result<T, StrudelError>;

impl From<String> for StrudelError {
    fn from(s: String) -> Self {
        StrudelError::Other(s)
    }
}

impl From<&str> for StrudelError {
    fn from(s: &str) -> Self {
        StrudelError::Other(s.to_string())
    }
}
