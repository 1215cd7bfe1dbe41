//! Wire-level error types.

use thiserror::Error;

/// Errors produced while decoding bytes into [`crate::Message`]s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("line exceeds {limit} bytes (got {actual})")]
    LineTooLong { actual: usize, limit: usize },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("empty command")]
    EmptyCommand,

    #[error("malformed prefix: {0}")]
    MalformedPrefix(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProtocolError {
    fn from(e: std::io::Error) -> Self {
        ProtocolError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
