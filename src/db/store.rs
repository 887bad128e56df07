//! Persistent store adapter
//!
//! Wraps a sled database holding the two index trees and exposes the small
//! surface the index needs: multi-tree write transactions and lock-free
//! reads. Everything sled-specific stays in this module.

use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionalTree,
};
use sled::{Db, IVec, Transactional, Tree};
use std::path::Path;

use super::error::DbError;

/// Result type used inside a write transaction
pub type TxResult<T> = ConflictableTransactionResult<T, DbError>;

/// Lift an index error into a transaction abort
///
/// # Errors
///
/// Returns the error wrapped as a transaction abort, rolling back the transaction.
pub fn aborting<T>(result: Result<T, DbError>) -> TxResult<T> {
    result.map_err(ConflictableTransactionError::Abort)
}

/// Named key-value namespace within the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// image path -> JSON list of tags
    ImagesToTags,
    /// tag -> JSON list of image paths
    TagsToImages,
}

impl Bucket {
    pub const ALL: [Self; 2] = [Self::ImagesToTags, Self::TagsToImages];

    /// Name of the sled tree backing this bucket
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ImagesToTags => "ImagesToTags",
            Self::TagsToImages => "TagsToImages",
        }
    }
}

/// Handle to the on-disk store
///
/// Uses two trees:
/// - `ImagesToTags` tree: `image_path` -> `Vec<tag>`
/// - `TagsToImages` tree: tag -> Vec<`image_path`>
pub struct Store {
    db: Db,
    images: Tree,
    tags: Tree,
}

impl Store {
    /// Opens or creates a store at the specified path
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or if the trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let db = sled::open(path)?;
        let images = db.open_tree(Bucket::ImagesToTags.name())?;
        let tags = db.open_tree(Bucket::TagsToImages.name())?;
        Ok(Self { db, images, tags })
    }

    const fn tree(&self, bucket: Bucket) -> &Tree {
        match bucket {
            Bucket::ImagesToTags => &self.images,
            Bucket::TagsToImages => &self.tags,
        }
    }

    /// Run `f` inside one serializable transaction spanning both trees.
    ///
    /// The closure may be invoked more than once if sled detects a conflict,
    /// so it must not have side effects outside the transaction. An error
    /// returned from the closure rolls back every write it made.
    ///
    /// # Errors
    ///
    /// Returns the error the closure aborted with, or `DbError::SledError` if
    /// the transaction could not be committed.
    pub fn write<A, F>(&self, f: F) -> Result<A, DbError>
    where
        F: Fn(&WriteTx<'_>) -> TxResult<A>,
    {
        let result = (&self.images, &self.tags).transaction(|(images, tags)| {
            let tx = WriteTx { images, tags };
            f(&tx)
        });
        Ok(result?)
    }

    /// Read a single value
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    pub fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<IVec>, DbError> {
        Ok(self.tree(bucket).get(key)?)
    }

    /// Visit every entry of a bucket in key order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails or `f` returns an error.
    pub fn for_each<F>(&self, bucket: Bucket, mut f: F) -> Result<(), DbError>
    where
        F: FnMut(&[u8], &[u8]) -> Result<(), DbError>,
    {
        for entry in self.tree(bucket).iter() {
            let (key, value) = entry?;
            f(&*key, &*value)?;
        }
        Ok(())
    }

    /// Number of keys in a bucket
    #[must_use]
    pub fn len(&self, bucket: Bucket) -> usize {
        self.tree(bucket).len()
    }

    /// Whether a key exists in a bucket
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    pub fn contains_key(&self, bucket: Bucket, key: &[u8]) -> Result<bool, DbError> {
        Ok(self.tree(bucket).contains_key(key)?)
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Remove every entry from both trees
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing either tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        for bucket in Bucket::ALL {
            self.tree(bucket).clear()?;
        }
        Ok(())
    }

    /// Flush and release the store
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the final flush fails.
    pub fn close(self) -> Result<(), DbError> {
        self.flush()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Errors cannot be propagated from Drop; call close() or flush()
        // when durability matters.
        let _ = self.db.flush();
    }
}

/// View of both trees inside a write transaction
pub struct WriteTx<'t> {
    images: &'t TransactionalTree,
    tags: &'t TransactionalTree,
}

impl WriteTx<'_> {
    const fn tree(&self, bucket: Bucket) -> &TransactionalTree {
        match bucket {
            Bucket::ImagesToTags => self.images,
            Bucket::TagsToImages => self.tags,
        }
    }

    /// # Errors
    ///
    /// Returns a transaction error if the read conflicts or fails.
    pub fn get(&self, bucket: Bucket, key: &str) -> TxResult<Option<IVec>> {
        Ok(self.tree(bucket).get(key.as_bytes())?)
    }

    /// # Errors
    ///
    /// Returns a transaction error if the write conflicts or fails.
    pub fn put(&self, bucket: Bucket, key: &str, value: Vec<u8>) -> TxResult<()> {
        self.tree(bucket).insert(key.as_bytes(), value)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a transaction error if the write conflicts or fails.
    pub fn delete(&self, bucket: Bucket, key: &str) -> TxResult<bool> {
        Ok(self.tree(bucket).remove(key.as_bytes())?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_both_buckets() {
        let (_dir, store) = open_temp();
        let names: Vec<Vec<u8>> = store.db.tree_names().into_iter().map(|n| n.to_vec()).collect();
        assert!(names.contains(&b"ImagesToTags".to_vec()));
        assert!(names.contains(&b"TagsToImages".to_vec()));
        assert_eq!(store.len(Bucket::ImagesToTags), 0);
    }

    #[test]
    fn test_write_commits_both_trees() {
        let (_dir, store) = open_temp();
        store
            .write(|tx| {
                tx.put(Bucket::ImagesToTags, "/a.jpg", b"[\"cat\"]".to_vec())?;
                tx.put(Bucket::TagsToImages, "cat", b"[\"/a.jpg\"]".to_vec())?;
                Ok(())
            })
            .unwrap();

        assert!(store.contains_key(Bucket::ImagesToTags, b"/a.jpg").unwrap());
        assert_eq!(
            store.get(Bucket::TagsToImages, b"cat").unwrap().unwrap().as_ref(),
            b"[\"/a.jpg\"]"
        );
    }

    #[test]
    fn test_write_abort_rolls_back() {
        let (_dir, store) = open_temp();
        let result: Result<(), DbError> = store.write(|tx| {
            tx.put(Bucket::ImagesToTags, "/a.jpg", b"[\"cat\"]".to_vec())?;
            aborting(Err(DbError::validation("boom")))
        });

        assert!(result.unwrap_err().is_validation());
        assert!(!store.contains_key(Bucket::ImagesToTags, b"/a.jpg").unwrap());
    }

    #[test]
    fn test_for_each_visits_in_key_order() {
        let (_dir, store) = open_temp();
        store
            .write(|tx| {
                tx.put(Bucket::TagsToImages, "pet", b"[]".to_vec())?;
                tx.put(Bucket::TagsToImages, "cat", b"[]".to_vec())?;
                Ok(())
            })
            .unwrap();

        let mut keys = Vec::new();
        store
            .for_each(Bucket::TagsToImages, |k, _| {
                keys.push(String::from_utf8_lossy(k).into_owned());
                Ok(())
            })
            .unwrap();
        assert_eq!(keys, vec!["cat", "pet"]);
    }

    #[test]
    fn test_delete_reports_presence() {
        let (_dir, store) = open_temp();
        let (first, second) = store
            .write(|tx| {
                tx.put(Bucket::TagsToImages, "cat", b"[]".to_vec())?;
                let first = tx.delete(Bucket::TagsToImages, "cat")?;
                let second = tx.delete(Bucket::TagsToImages, "cat")?;
                Ok((first, second))
            })
            .unwrap();
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn test_clear_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store");
        {
            let store = Store::open(&path).unwrap();
            store
                .write(|tx| tx.put(Bucket::ImagesToTags, "/a.jpg", b"[\"x\"]".to_vec()))
                .unwrap();
            store.close().unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.len(Bucket::ImagesToTags), 1);
        store.clear().unwrap();
        assert_eq!(store.len(Bucket::ImagesToTags), 0);
    }
}
