//! Testing utilities for pictag
//!
//! This module provides helper types for writing tests, including a `TestDb`
//! wrapper for temporary index management and an `ImageDir` fixture holding
//! real files.
//!
//! Only available when compiled with `cfg(test)`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::db::TagIndex;

/// Wrapper for a temporary test index that cleans up on drop
///
/// The index lives in its own temporary directory, so parallel tests never
/// share state.
///
/// # Examples
/// ```ignore
/// let test_db = TestDb::new();
/// let index = test_db.index();
///
/// index.add_tag("/a.jpg", "cat").unwrap();
/// assert_eq!(index.image_count(), 1);
/// // Index automatically removed when test_db is dropped
/// ```
pub struct TestDb {
    // Field order matters: the index must be closed before the directory goes.
    index: TagIndex,
    dir: TempDir,
}

impl TestDb {
    /// Create a new empty index in a fresh temporary directory
    ///
    /// # Panics
    /// Panics if the directory or index cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let index = TagIndex::open(dir.path().join("index")).expect("Failed to open test index");
        Self { index, dir }
    }

    /// Get a reference to the underlying index
    #[must_use]
    pub const fn index(&self) -> &TagIndex {
        &self.index
    }

    /// Get the path to the index directory
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("index")
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary directory pre-populated with files
pub struct ImageDir {
    dir: TempDir,
}

impl ImageDir {
    /// Create a temporary directory holding one small file per name
    ///
    /// # Panics
    /// Panics if the directory or any file cannot be created.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for name in names {
            fs::write(dir.path().join(name), b"test content").expect("Failed to write test file");
        }
        Self { dir }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file inside the directory
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_basic() {
        let test_db = TestDb::new();
        assert_eq!(test_db.index().image_count(), 0);
        assert!(test_db.path().exists());
    }

    #[test]
    fn test_db_cleanup() {
        let path = {
            let test_db = TestDb::new();
            test_db.index().add_tag("/a.jpg", "cat").unwrap();
            test_db.path()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_image_dir_creates_files() {
        let dir = ImageDir::new(&["a.jpg", "b.png"]);
        assert!(dir.file("a.jpg").exists());
        assert_eq!(fs::read(dir.file("b.png")).unwrap(), b"test content");
    }
}
