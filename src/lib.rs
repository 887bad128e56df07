//! Pictag - A bidirectional image tagging index
//!
//! This library keeps two mutually consistent inverted indices (image to
//! tags, tag to images) in an embedded database, and layers best-effort
//! batch operations on top: directory tagging, renames, normalization and
//! cleanup of stale entries.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod orchestrator;
pub mod output;
pub mod scanner;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum PictagError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A best-effort operation finished but some targets failed
    #[error("Batch finished with {failed} failure(s) ({succeeded} succeeded): {first}")]
    PartialBatch {
        succeeded: usize,
        failed: usize,
        first: Box<PictagError>,
    },
}

impl PictagError {
    /// Whether the error is a rejected argument rather than a runtime failure
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::DbError(db::DbError::Validation(_))
        )
    }
}
