//! Multi-step tag operations built on the index
//!
//! Every operation here is a sequence of `TagIndex` primitives. Each
//! primitive is atomic on its own; the sequences are not. Failures are
//! logged and counted per target without aborting the rest (unless
//! `BatchOptions::continue_on_error` is off), and callers get a
//! `BatchOutcome` with counts and the first error.
//!
//! - `core`: options, outcome types and the fan-out helper
//! - `batch`: per-image, per-directory and derived tagging
//! - `tag_ops`: rename, normalization and global removal
//! - `cleanup`: stale-file and orphaned-tag sweeps, image deletion

mod batch;
mod cleanup;
mod core;
mod tag_ops;

pub use self::core::{BatchOptions, BatchOutcome, CleanupReport, TagAction};

use crate::db::TagIndex;
use crate::scanner::{DirScanner, FileScanner};

/// Orchestrates best-effort operations over a borrowed index
pub struct TagOrchestrator<'a, S = DirScanner> {
    index: &'a TagIndex,
    scanner: S,
    options: BatchOptions,
}

impl<'a> TagOrchestrator<'a, DirScanner> {
    /// Orchestrator over the real file system with default options
    #[must_use]
    pub fn new(index: &'a TagIndex) -> Self {
        Self::with_scanner(index, DirScanner)
    }
}

impl<'a, S: FileScanner> TagOrchestrator<'a, S> {
    #[must_use]
    pub fn with_scanner(index: &'a TagIndex, scanner: S) -> Self {
        Self {
            index,
            scanner,
            options: BatchOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> BatchOptions {
        self.options
    }

    #[must_use]
    pub const fn index(&self) -> &'a TagIndex {
        self.index
    }
}
