//! All error types for the resxify crate.
//!
//! These are returned from every fallible operation (mapping decode, file I/O,
//! pattern compilation, resource synchronization).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a new decode error for the given file.
    pub fn decode_error(path: impl std::fmt::Display, detail: impl Into<String>) -> Self {
        Error::Decode(format!("{}: {}", path, detail.into()))
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
