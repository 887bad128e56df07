use std::path::Path;

use tracing::{info, warn};

use super::TagOrchestrator;
use super::core::CleanupReport;
use crate::PictagError;
use crate::db::PathString;
use crate::scanner::FileScanner;

type Result<T> = std::result::Result<T, PictagError>;

impl<S: FileScanner> TagOrchestrator<'_, S> {
    /// Sweep the index for stale entries.
    ///
    /// Phase 1 drops every association of images whose file no longer
    /// exists; files whose existence cannot be checked are kept and counted
    /// as failures. Phase 2 deletes tags reported with zero images, including any
    /// orphaned by phase 1. Each phase runs even if the other could not
    /// enumerate its keys.
    #[must_use]
    pub fn clean_database(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        self.clean_missing_files(&mut report);
        self.clean_orphaned_tags(&mut report);
        info!(
            files_cleaned = report.files_cleaned,
            tags_cleaned = report.tags_cleaned,
            failed = report.failed,
            "database cleanup finished"
        );
        report
    }

    fn clean_missing_files(&self, report: &mut CleanupReport) {
        let paths = match self.index.get_all_image_paths() {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, "could not enumerate images, skipping missing-file sweep");
                report.add_error(e);
                return;
            }
        };

        for path in &paths {
            match self.scanner.exists(path) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot check file, keeping its tags");
                    report.add_error(e);
                    continue;
                }
            }
            match self.index.remove_all_tags_for_image(path) {
                Ok(_) => report.files_cleaned += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to clean missing file");
                    report.add_error(e);
                }
            }
        }
    }

    fn clean_orphaned_tags(&self, report: &mut CleanupReport) {
        let tags = match self.index.get_all_tags() {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, "could not enumerate tags, skipping orphaned-tag sweep");
                report.add_error(e);
                return;
            }
        };

        for entry in tags.iter().filter(|t| t.count == 0) {
            match self.index.delete_orphaned_tag_key(&entry.tag) {
                Ok(true) => report.tags_cleaned += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(tag = %entry.tag, error = %e, "failed to delete orphaned tag");
                    report.add_error(e);
                }
            }
        }
    }

    /// Delete an image file, then drop all its tags.
    ///
    /// The index is only touched after the file is gone. Returns the number
    /// of tags removed.
    ///
    /// # Errors
    /// Returns `PictagError::IoError` if the file cannot be deleted (the index
    /// is left untouched), or a storage error from the index.
    pub fn delete_image_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        PathString::new(path)?;
        self.scanner.remove_file(path)?;
        let removed = self.index.remove_all_tags_for_image(path)?;
        info!(path = %path.display(), removed, "deleted image file");
        Ok(removed)
    }
}
