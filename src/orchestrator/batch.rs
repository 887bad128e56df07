use std::path::Path;

use tracing::info;

use super::TagOrchestrator;
use super::core::{BatchOutcome, TagAction};
use crate::PictagError;
use crate::db::types::validate_tag;
use crate::scanner::FileScanner;

type Result<T> = std::result::Result<T, PictagError>;

/// Reject an empty tag list or any empty tag before work starts
pub(super) fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.is_empty() {
        return Err(PictagError::InvalidInput("No tags provided".into()));
    }
    for tag in tags {
        validate_tag(tag)?;
    }
    Ok(())
}

impl<S: FileScanner> TagOrchestrator<'_, S> {
    /// Add several tags to one image, stopping at the first failure.
    ///
    /// Tags applied before the failure stay applied. Returns the number of
    /// tags applied.
    ///
    /// # Errors
    /// Returns the first primitive error.
    pub fn add_tags_to_image<P: AsRef<Path>>(&self, path: P, tags: &[String]) -> Result<usize> {
        self.apply_until_error(path.as_ref(), tags, TagAction::Add)
    }

    /// Remove several tags from one image, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first primitive error.
    pub fn remove_tags_from_image<P: AsRef<Path>>(
        &self,
        path: P,
        tags: &[String],
    ) -> Result<usize> {
        self.apply_until_error(path.as_ref(), tags, TagAction::Remove)
    }

    fn apply_until_error(&self, path: &Path, tags: &[String], action: TagAction) -> Result<usize> {
        validate_tags(tags)?;
        for tag in tags {
            action.apply(self.index, path, tag)?;
        }
        Ok(tags.len())
    }

    /// Tag every supported image directly inside `dir`.
    ///
    /// `processed` counts files, `succeeded`/`failed` count (file, tag) pairs.
    /// Earlier successes are kept when later pairs fail.
    ///
    /// # Errors
    /// Returns `PictagError::InvalidInput` or a validation error for bad tags,
    /// and `PictagError::IoError` if the directory cannot be listed.
    pub fn batch_add_tags_to_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        tags: &[String],
    ) -> Result<BatchOutcome> {
        self.batch_directory(dir.as_ref(), tags, TagAction::Add)
    }

    /// Untag every supported image directly inside `dir`.
    ///
    /// # Errors
    /// Same as [`Self::batch_add_tags_to_directory`].
    pub fn batch_remove_tags_from_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        tags: &[String],
    ) -> Result<BatchOutcome> {
        self.batch_directory(dir.as_ref(), tags, TagAction::Remove)
    }

    fn batch_directory(&self, dir: &Path, tags: &[String], action: TagAction) -> Result<BatchOutcome> {
        validate_tags(tags)?;
        let files = self.scanner.list_images(dir)?;

        let outcome = self.fan_out(&files, |file| self.apply_tags(file, tags, action));
        info!(
            dir = %dir.display(),
            files = outcome.processed,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "batch {} finished",
            action.verb()
        );
        Ok(outcome)
    }

    /// Add `new_tags` to every image that already carries `existing_tag`.
    ///
    /// `succeeded` is the number of tag instances added.
    ///
    /// # Errors
    /// Returns a validation error for bad tags, or a storage error if the
    /// images of `existing_tag` cannot be read.
    pub fn add_tags_to_tagged_images(
        &self,
        existing_tag: &str,
        new_tags: &[String],
    ) -> Result<BatchOutcome> {
        validate_tag(existing_tag)?;
        validate_tags(new_tags)?;
        let images = self.index.get_images(existing_tag)?;

        let outcome = self.fan_out(&images, |image| self.apply_tags(image, new_tags, TagAction::Add));
        info!(
            tag = existing_tag,
            images = outcome.processed,
            added = outcome.succeeded,
            failed = outcome.failed,
            "derived tagging finished"
        );
        Ok(outcome)
    }
}
