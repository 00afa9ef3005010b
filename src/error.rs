//! Custom error types for mail-triage.

use std::fmt;
use std::io;

/// Main error type for triage operations.
#[derive(Debug)]
pub enum Error {
    /// I/O errors (network, file operations)
    Io(io::Error),
    /// A record failed validation (non-fatal; the record is dropped)
    Validation(String),
    /// No valid records remained after validation
    EmptyBatch,
    /// Model-backed strategy failed to initialize or answer
    Model(String),
    /// Configuration errors (keyword file, model options)
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::EmptyBatch => write!(f, "no valid messages in batch"),
            Self::Model(msg) => write!(f, "model error: {msg}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(io_err) => io_err,
            other => Self::other(other.to_string()),
        }
    }
}

/// Result type alias for triage operations.
pub type Result<T> = std::result::Result<T, Error>;
