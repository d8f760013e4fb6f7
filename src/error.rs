//! Centralized error types for addressparser.
//!
//! [`crate::parse`] itself is total and never produces these; they come from
//! the bounded [`crate::parse_with`] and from configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the addressparser library.
#[derive(Error, Debug)]
pub enum AddressError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Invalid config '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// The address field is longer than the configured limit.
    #[error("Address field is {len} bytes, limit is {max}")]
    InputTooLong { len: usize, max: usize },

    /// Groups are nested deeper than the configured limit.
    #[error("Address groups nested deeper than {max} levels")]
    GroupTooDeep { max: usize },
}

/// Convenience alias for `Result<T, AddressError>`.
pub type Result<T> = std::result::Result<T, AddressError>;

impl AddressError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
