//! Index-specific error types
//!
//! This module defines all error types that can occur during index operations.
//! Errors fall into two groups:
//!
//! - **Validation**: an empty or unusable path/tag argument, rejected before
//!   any transaction begins
//! - **Storage**: the underlying sled transaction failed or a stored member
//!   list could not be encoded/decoded; the enclosing transaction has been
//!   rolled back in full
//!
//! Looking up an unknown image or tag is never an error.

use sled::transaction::TransactionError;
use thiserror::Error;

/// Index-level errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Empty or otherwise unusable argument to a primitive
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Represents a sled database error
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    /// A member list could not be encoded to or decoded from JSON
    #[error("Error while encoding member list: {0}")]
    CodecError(#[from] serde_json::Error),

    /// A key or path is not valid UTF-8
    #[error("Error during serialization: {0}")]
    SerializeError(String),
}

impl DbError {
    /// Shorthand for building a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True if the call was rejected before touching the store
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True if a transaction failed and was rolled back
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        !self.is_validation()
    }
}

impl From<TransactionError<Self>> for DbError {
    fn from(err: TransactionError<Self>) -> Self {
        match err {
            TransactionError::Abort(inner) => inner,
            TransactionError::Storage(e) => Self::SledError(e),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
