use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::TagOrchestrator;
use crate::PictagError;
use crate::db::{DbError, TagIndex};
use crate::scanner::FileScanner;

/// Policy knobs for multi-target operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Keep going after a failed target instead of stopping at the first one
    pub continue_on_error: bool,
    /// Fan targets out over the rayon pool (only with `continue_on_error`)
    pub parallel: bool,
    /// Rename/normalize each image in one transaction rather than remove-then-add
    pub atomic_retag: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            parallel: false,
            atomic_retag: true,
        }
    }
}

/// Direction of a per-tag mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Add,
    Remove,
}

impl TagAction {
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    pub(crate) fn apply(self, index: &TagIndex, path: &Path, tag: &str) -> Result<(), DbError> {
        match self {
            Self::Add => index.add_tag(path, tag),
            Self::Remove => index.remove_tag(path, tag),
        }
    }
}

/// Aggregate result of a best-effort operation
///
/// Only the first failure is kept; later ones are counted and logged.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Targets (images or files) visited
    pub processed: usize,
    /// Primitive calls that succeeded
    pub succeeded: usize,
    /// Primitive calls that failed
    pub failed: usize,
    /// Earliest failure in input order
    pub first_error: Option<PictagError>,
}

impl BatchOutcome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn add_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn add_error(&mut self, error: impl Into<PictagError>) {
        self.failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error.into());
        }
    }

    /// Combine two outcomes, keeping `self`'s first error if it has one
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        if self.first_error.is_none() {
            self.first_error = other.first_error;
        }
        self
    }

    /// `(succeeded, failed)`
    #[must_use]
    pub const fn counts(&self) -> (usize, usize) {
        (self.succeeded, self.failed)
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Turn a non-clean outcome into `PictagError::PartialBatch`
    ///
    /// # Errors
    /// Returns `PictagError::PartialBatch` if any target failed.
    pub fn into_result(self) -> Result<usize, PictagError> {
        match self.first_error {
            Some(first) if self.failed > 0 => Err(PictagError::PartialBatch {
                succeeded: self.succeeded,
                failed: self.failed,
                first: Box::new(first),
            }),
            _ => Ok(self.succeeded),
        }
    }
}

/// Result of `clean_database`
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Images whose file was gone and whose tags were removed
    pub files_cleaned: usize,
    /// Tag keys deleted because they had no images
    pub tags_cleaned: usize,
    /// Steps that failed, in either phase
    pub failed: usize,
    /// First failed step
    pub first_error: Option<PictagError>,
}

impl CleanupReport {
    pub fn add_error(&mut self, error: impl Into<PictagError>) {
        self.failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error.into());
        }
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// # Errors
    /// Returns `PictagError::PartialBatch` if any cleanup step failed.
    pub fn into_result(self) -> Result<(usize, usize), PictagError> {
        match self.first_error {
            Some(first) if self.failed > 0 => Err(PictagError::PartialBatch {
                succeeded: self.files_cleaned + self.tags_cleaned,
                failed: self.failed,
                first: Box::new(first),
            }),
            _ => Ok((self.files_cleaned, self.tags_cleaned)),
        }
    }
}

impl<S: FileScanner> TagOrchestrator<'_, S> {
    /// Run `op` once per item and fold the outcomes in input order.
    ///
    /// Parallel runs join before folding, so `first_error` is the same as a
    /// sequential run would report. Without `continue_on_error` the loop is
    /// sequential and stops after the first item that failed.
    pub(crate) fn fan_out<T, F>(&self, items: &[T], op: F) -> BatchOutcome
    where
        T: Sync,
        F: Fn(&T) -> BatchOutcome + Sync,
    {
        if self.options.parallel && self.options.continue_on_error {
            let outcomes: Vec<BatchOutcome> = items.par_iter().map(|item| op(item)).collect();
            return outcomes
                .into_iter()
                .fold(BatchOutcome::new(), BatchOutcome::merge);
        }

        let mut total = BatchOutcome::new();
        for item in items {
            let outcome = op(item);
            let stop = !outcome.is_clean() && !self.options.continue_on_error;
            total = total.merge(outcome);
            if stop {
                break;
            }
        }
        total
    }

    /// Apply every tag to one image, honouring `continue_on_error`
    pub(crate) fn apply_tags(&self, path: &Path, tags: &[String], action: TagAction) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            processed: 1,
            ..BatchOutcome::default()
        };
        for tag in tags {
            match action.apply(self.index, path, tag) {
                Ok(()) => outcome.add_success(),
                Err(e) => {
                    warn!(path = %path.display(), tag = %tag, error = %e, "failed to {} tag", action.verb());
                    outcome.add_error(e);
                    if !self.options.continue_on_error {
                        break;
                    }
                }
            }
        }
        outcome
    }
}
