//! Error taxonomy for the ledger engine.
//!
//! Every failure class that can cross the coordinator/query boundary is a
//! variant here; callers receive it converted into a structured result with
//! a serializable [`ErrorKind`], never as an uncaught fault.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Engine-wide error types
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Read or update addressed a key that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Create addressed a key that already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Malformed argument or operation payload
    #[error("validation failed: {0}")]
    Validation(String),

    /// Commit/ordering service unreachable or timed out
    #[error("commit substrate unavailable: {0}")]
    SubstrateUnavailable(String),

    /// Stored document failed to encode or decode
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Storage-level I/O failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Illegal state transition or misuse of a component contract
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl LedgerError {
    /// Gets the serializable kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::SubstrateUnavailable(_) => ErrorKind::SubstrateUnavailable,
            LedgerError::Serialization(_) => ErrorKind::Serialization,
            LedgerError::Storage(_) => ErrorKind::Storage,
            LedgerError::InvalidOperation(_) => ErrorKind::InvalidOperation,
        }
    }

    /// Whether a caller may retry the same operation with fresh arguments.
    ///
    /// Only substrate unavailability is retryable; a retry is a new
    /// submission with a new transaction id, never a resurrection of the
    /// failed one.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::SubstrateUnavailable(_))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

/// Serializable error classification recorded with failed transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Validation,
    SubstrateUnavailable,
    Serialization,
    Storage,
    InvalidOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Validation => "validation",
            ErrorKind::SubstrateUnavailable => "substrate_unavailable",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Storage => "storage",
            ErrorKind::InvalidOperation => "invalid_operation",
        };
        write!(f, "{}", name)
    }
}
