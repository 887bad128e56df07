//! File system collaborator for batch and cleanup operations
//!
//! The orchestrator never touches the file system directly. It goes through
//! a [`FileScanner`], which lists the files directly inside a directory,
//! checks whether an indexed file still exists, and deletes files. Tests
//! substitute an in-memory implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Image extensions recognised by batch operations (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Check whether a path has a supported image extension
///
/// # Examples
/// ```
/// use pictag::scanner::is_supported_image;
///
/// assert!(is_supported_image("/photos/a.JPG"));
/// assert!(!is_supported_image("/photos/notes.txt"));
/// ```
#[must_use]
pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Trait for enumerating and inspecting candidate image files
pub trait FileScanner: Sync {
    /// List the regular files directly inside `dir` (non-recursive).
    ///
    /// Symlinks are followed, so a link to an image is listed under the
    /// link's own path. Dangling links are skipped.
    ///
    /// # Errors
    /// Returns an `io::Error` if the directory cannot be read.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether a file currently exists at `path`
    ///
    /// `Ok(false)` means the file is definitely gone. A file that cannot be
    /// inspected is an error, never "missing".
    ///
    /// # Errors
    /// Returns an `io::Error` if existence cannot be determined.
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    /// Delete the file at `path`
    ///
    /// # Errors
    /// Returns an `io::Error` if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    /// List the supported images directly inside `dir`, sorted
    ///
    /// # Errors
    /// Returns an `io::Error` if the directory cannot be read.
    fn list_images(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut images: Vec<PathBuf> = self
            .list_entries(dir)?
            .into_iter()
            .filter(|p| is_supported_image(p))
            .collect();
        images.sort();
        Ok(images)
    }
}

/// Scanner backed by the real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct DirScanner;

impl FileScanner for DirScanner {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}
