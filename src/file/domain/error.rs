//! Error types for file domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing file values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileDomainError {
    /// The file name is empty after trimming.
    #[error("file name must not be empty")]
    EmptyName,
}

/// Error returned while parsing permissions from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown permission: {0}")]
pub struct ParsePermissionError(pub String);
