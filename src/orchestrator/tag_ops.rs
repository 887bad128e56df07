use std::path::Path;

use tracing::{debug, info, warn};

use super::TagOrchestrator;
use super::core::BatchOutcome;
use crate::PictagError;
use crate::db::DbError;
use crate::db::types::validate_tag;
use crate::scanner::FileScanner;

type Result<T> = std::result::Result<T, PictagError>;

impl<S: FileScanner> TagOrchestrator<'_, S> {
    /// Rename a tag on every image that carries it.
    ///
    /// If `new_tag` already exists the two sets are merged. The `old_tag`
    /// key is deleted once no image references it, including a key already
    /// stored with no images. A tag that does not exist is a successful no-op.
    ///
    /// # Errors
    /// Returns a validation error if either tag is empty or they are equal,
    /// or a storage error if the images of `old_tag` cannot be read.
    pub fn replace_tag(&self, old_tag: &str, new_tag: &str) -> Result<BatchOutcome> {
        validate_tag(old_tag)?;
        validate_tag(new_tag)?;
        if old_tag == new_tag {
            return Err(DbError::validation("Old and new tag names are identical").into());
        }

        let images = self.index.get_images(old_tag)?;
        if images.is_empty() {
            debug!(tag = old_tag, "no images carry tag, only dropping its key");
        }

        let mut outcome = self.fan_out(&images, |image| self.retag(image, old_tag, new_tag));
        self.drop_if_orphaned(old_tag, &mut outcome);
        info!(
            from = old_tag,
            to = new_tag,
            images = outcome.processed,
            failed = outcome.failed,
            "renamed tag"
        );
        Ok(outcome)
    }

    /// Lower-case every tag that is not already lower case.
    ///
    /// Each such tag is migrated like `replace_tag`; tags that collide after
    /// lower-casing are merged.
    ///
    /// # Errors
    /// Returns a storage error if the tag list cannot be read. Per-tag and
    /// per-image failures are reported through the outcome.
    pub fn normalize_all_tags(&self) -> Result<BatchOutcome> {
        let tags = self.index.get_all_tags()?;
        let mut outcome = BatchOutcome::new();
        let mut normalized = 0;

        for entry in &tags {
            let lower = entry.tag.to_lowercase();
            if lower == entry.tag {
                continue;
            }

            let images = match self.index.get_images(&entry.tag) {
                Ok(images) => images,
                Err(e) => {
                    warn!(tag = %entry.tag, error = %e, "failed to read images for tag");
                    outcome.add_error(e);
                    if self.options.continue_on_error {
                        continue;
                    }
                    break;
                }
            };

            let mut migrated = self.fan_out(&images, |image| self.retag(image, &entry.tag, &lower));
            self.drop_if_orphaned(&entry.tag, &mut migrated);
            let stop = !migrated.is_clean() && !self.options.continue_on_error;
            if migrated.is_clean() {
                normalized += 1;
            }
            outcome = outcome.merge(migrated);
            if stop {
                break;
            }
        }

        info!(
            tags = normalized,
            images = outcome.processed,
            failed = outcome.failed,
            "normalized tags"
        );
        Ok(outcome)
    }

    /// Remove a tag from every image that carries it.
    ///
    /// A tag with no images is a successful no-op.
    ///
    /// # Errors
    /// Returns a validation error for an empty tag, or a storage error if the
    /// images of the tag cannot be read.
    pub fn remove_tag_globally(&self, tag: &str) -> Result<BatchOutcome> {
        validate_tag(tag)?;
        let images = self.index.get_images(tag)?;

        let outcome = self.fan_out(&images, |image| {
            let mut outcome = BatchOutcome {
                processed: 1,
                ..BatchOutcome::default()
            };
            match self.index.remove_tag(image, tag) {
                Ok(()) => outcome.add_success(),
                Err(e) => {
                    warn!(path = %image.display(), tag, error = %e, "failed to remove tag");
                    outcome.add_error(e);
                }
            }
            outcome
        });
        info!(
            tag,
            removed = outcome.succeeded,
            failed = outcome.failed,
            "removed tag globally"
        );
        Ok(outcome)
    }

    /// Move one image from `from` to `to`
    ///
    /// With `atomic_retag` this is a single transaction; otherwise it is a
    /// remove followed by an add, and `to` is not added if the remove failed.
    fn retag(&self, path: &Path, from: &str, to: &str) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            processed: 1,
            ..BatchOutcome::default()
        };
        let result = if self.options.atomic_retag {
            self.index.retag_image(path, from, to)
        } else {
            self.index
                .remove_tag(path, from)
                .and_then(|()| self.index.add_tag(path, to))
        };
        match result {
            Ok(()) => outcome.add_success(),
            Err(e) => {
                warn!(path = %path.display(), from, to, error = %e, "failed to retag image");
                outcome.add_error(e);
            }
        }
        outcome
    }

    /// Delete `tag`'s key if no image references it any more
    fn drop_if_orphaned(&self, tag: &str, outcome: &mut BatchOutcome) {
        match self.index.get_images(tag) {
            Ok(images) if images.is_empty() => {
                if let Err(e) = self.index.delete_orphaned_tag_key(tag) {
                    warn!(tag, error = %e, "failed to delete orphaned tag key");
                    outcome.add_error(e);
                }
            }
            Ok(images) => {
                debug!(tag, remaining = images.len(), "tag still in use, keeping key");
            }
            Err(e) => {
                warn!(tag, error = %e, "failed to check tag before deleting it");
                outcome.add_error(e);
            }
        }
    }
}
