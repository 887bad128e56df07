//! Tag index module for pictag
//!
//! Provides a clean API for storing and retrieving image-tag associations
//! using sled as the embedded database backend.
//!
//! Uses two sled trees as mutually consistent inverted indices:
//! - `ImagesToTags`: image path -> tags
//! - `TagsToImages`: tag -> image paths
//!
//! Every mutating primitive updates both trees in a single transaction, so a
//! reader never sees one side updated and the other stale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

pub mod error;
pub mod store;
pub mod types;

pub use error::DbError;
pub use store::{Bucket, Store};
pub use types::{Inconsistency, MemberList, PathString, Side, TagWithCount};

use store::{TxResult, WriteTx, aborting};
use types::validate_tag;

/// Bidirectional image/tag index
///
/// Owns the store for its whole lifetime; orchestration code borrows the
/// index rather than the store.
pub struct TagIndex {
    store: Store,
}

impl TagIndex {
    /// Wrap an already opened store
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Opens or creates an index at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use pictag::db::TagIndex;
    /// let index = TagIndex::open("my_index").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or its trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        Ok(Self::new(Store::open(path)?))
    }

    /// Access the underlying store
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Flush and release the index
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the final flush fails.
    pub fn close(self) -> Result<(), DbError> {
        self.store.close()
    }

    /// Attach `tag` to the image at `path`
    ///
    /// Adding an association that already exists is a no-op; nothing is
    /// rewritten.
    ///
    /// # Examples
    /// ```no_run
    /// use pictag::db::TagIndex;
    ///
    /// let index = TagIndex::open("my_index").unwrap();
    /// index.add_tag("/photos/a.jpg", "cat").unwrap();
    /// assert_eq!(index.get_tags("/photos/a.jpg").unwrap(), vec!["cat"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` if the path or tag is empty, or a storage
    /// error if the transaction fails (in which case neither tree changed).
    pub fn add_tag<P: AsRef<Path>>(&self, path: P, tag: &str) -> Result<(), DbError> {
        let path = PathString::new(path)?;
        let tag = validate_tag(tag)?;

        let changed = self.store.write(|tx| {
            let forward = insert_member(tx, Bucket::ImagesToTags, &path, tag)?;
            let reverse = insert_member(tx, Bucket::TagsToImages, tag, &path)?;
            Ok(forward || reverse)
        })?;

        if changed {
            debug!(path = &*path, tag, "added tag");
        }
        Ok(())
    }

    /// Detach `tag` from the image at `path`
    ///
    /// Removing an association that does not exist succeeds without change.
    /// A list emptied by the removal has its key deleted.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` if the path or tag is empty, or a storage
    /// error if the transaction fails.
    pub fn remove_tag<P: AsRef<Path>>(&self, path: P, tag: &str) -> Result<(), DbError> {
        let path = PathString::new(path)?;
        let tag = validate_tag(tag)?;

        let changed = self.store.write(|tx| {
            let forward = remove_member(tx, Bucket::ImagesToTags, &path, tag)?;
            let reverse = remove_member(tx, Bucket::TagsToImages, tag, &path)?;
            Ok(forward || reverse)
        })?;

        if changed {
            debug!(path = &*path, tag, "removed tag");
        }
        Ok(())
    }

    /// Replace `remove` with `add` on one image in a single transaction
    ///
    /// Used by rename and normalization so an image is never left carrying
    /// both tags or neither.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` if any argument is empty or the two tags
    /// are equal, or a storage error if the transaction fails.
    pub fn retag_image<P: AsRef<Path>>(
        &self,
        path: P,
        remove: &str,
        add: &str,
    ) -> Result<(), DbError> {
        let path = PathString::new(path)?;
        let remove = validate_tag(remove)?;
        let add = validate_tag(add)?;
        if remove == add {
            return Err(DbError::validation(format!(
                "cannot retag '{remove}' to itself"
            )));
        }

        self.store.write(|tx| {
            remove_member(tx, Bucket::ImagesToTags, &path, remove)?;
            remove_member(tx, Bucket::TagsToImages, remove, &path)?;
            insert_member(tx, Bucket::ImagesToTags, &path, add)?;
            insert_member(tx, Bucket::TagsToImages, add, &path)?;
            Ok(())
        })?;

        debug!(path = &*path, from = remove, to = add, "retagged image");
        Ok(())
    }

    /// Get the tags attached to an image, sorted
    ///
    /// An unknown image yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the path is invalid, the read fails, or the stored
    /// list cannot be decoded.
    pub fn get_tags<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>, DbError> {
        let path = PathString::new(path)?;
        let value = self.store.get(Bucket::ImagesToTags, path.as_bytes())?;
        Ok(MemberList::decode_opt(value)?.into_sorted())
    }

    /// Get the images carrying a tag, sorted by path string
    ///
    /// An unknown tag yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the tag is empty, the read fails, or the stored
    /// list cannot be decoded.
    pub fn get_images(&self, tag: &str) -> Result<Vec<PathBuf>, DbError> {
        let tag = validate_tag(tag)?;
        let value = self.store.get(Bucket::TagsToImages, tag.as_bytes())?;
        Ok(MemberList::decode_opt(value)?
            .into_sorted()
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    /// Get every tag with the number of images it is attached to, sorted by tag
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails, a key is not UTF-8, or a stored
    /// list cannot be decoded.
    pub fn get_all_tags(&self) -> Result<Vec<TagWithCount>, DbError> {
        let mut tags = Vec::with_capacity(self.store.len(Bucket::TagsToImages));
        // sled iterates in byte order, which is also `str` order for UTF-8
        self.store.for_each(Bucket::TagsToImages, |key, value| {
            let tag = key_to_string(key)?;
            let count = MemberList::decode(value)?.len();
            tags.push(TagWithCount::new(tag, count));
            Ok(())
        })?;
        Ok(tags)
    }

    /// Get every image path that has at least one tag, sorted
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails or a key is not UTF-8.
    pub fn get_all_image_paths(&self) -> Result<Vec<PathBuf>, DbError> {
        let mut paths = Vec::with_capacity(self.store.len(Bucket::ImagesToTags));
        self.store.for_each(Bucket::ImagesToTags, |key, _| {
            paths.push(PathBuf::from(key_to_string(key)?));
            Ok(())
        })?;
        Ok(paths)
    }

    /// Drop every association of an image
    ///
    /// Each of the image's tags loses the path (tags left with no images are
    /// deleted), then the image key itself is deleted, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` if the path is empty, or a storage error
    /// if the transaction fails.
    pub fn remove_all_tags_for_image<P: AsRef<Path>>(&self, path: P) -> Result<usize, DbError> {
        let path = PathString::new(path)?;

        let removed = self.store.write(|tx| {
            let tags = aborting(MemberList::decode_opt(tx.get(Bucket::ImagesToTags, &path)?))?;
            for tag in tags.iter() {
                remove_member(tx, Bucket::TagsToImages, tag, &path)?;
            }
            tx.delete(Bucket::ImagesToTags, &path)?;
            Ok(tags.len())
        })?;

        debug!(path = &*path, removed, "removed all tags for image");
        Ok(removed)
    }

    /// Delete a tag key from the reverse index without touching any image
    ///
    /// The caller must have checked that the tag has no images left; this
    /// primitive does not verify it. Returns whether the key existed.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` if the tag is empty, or a storage error if
    /// the transaction fails.
    pub fn delete_orphaned_tag_key(&self, tag: &str) -> Result<bool, DbError> {
        let tag = validate_tag(tag)?;
        let existed = self.store.write(|tx| tx.delete(Bucket::TagsToImages, tag))?;
        if existed {
            debug!(tag, "deleted orphaned tag key");
        }
        Ok(existed)
    }

    /// Check if an image has any tags
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the path is invalid or the read fails.
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> Result<bool, DbError> {
        let path = PathString::new(path)?;
        self.store.contains_key(Bucket::ImagesToTags, path.as_bytes())
    }

    /// Number of images with at least one tag
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.store.len(Bucket::ImagesToTags)
    }

    /// Number of distinct tag keys
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.store.len(Bucket::TagsToImages)
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.store.flush()
    }

    /// Clear all entries from the index
    ///
    /// # Warning
    /// This operation is irreversible!
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing either tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        self.store.clear()
    }

    /// Audit both trees against each other
    ///
    /// Reports every one-sided association, every key stored with an empty
    /// list and every duplicated member. An empty result means the index is
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails or a value is not a JSON string list.
    pub fn verify(&self) -> Result<Vec<Inconsistency>, DbError> {
        let images = self.load_raw(Bucket::ImagesToTags)?;
        let tags = self.load_raw(Bucket::TagsToImages)?;
        let mut issues = Vec::new();

        for (side, lists) in [(Side::Images, &images), (Side::Tags, &tags)] {
            for (key, members) in lists {
                if members.is_empty() {
                    issues.push(Inconsistency::EmptyKey {
                        side,
                        key: key.clone(),
                    });
                }
                let mut seen = MemberList::default();
                for member in members {
                    if !seen.insert(member) {
                        issues.push(Inconsistency::DuplicateMember {
                            side,
                            key: key.clone(),
                            member: member.clone(),
                        });
                    }
                }
            }
        }

        for (path, path_tags) in &images {
            for tag in path_tags {
                let listed = tags.get(tag).is_some_and(|p| p.contains(path));
                if !listed {
                    issues.push(Inconsistency::MissingImage {
                        path: path.clone(),
                        tag: tag.clone(),
                    });
                }
            }
        }
        for (tag, tag_paths) in &tags {
            for path in tag_paths {
                let listed = images.get(path).is_some_and(|t| t.contains(tag));
                if !listed {
                    issues.push(Inconsistency::MissingTag {
                        tag: tag.clone(),
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(issues)
    }

    /// Load a bucket without deduplicating, for auditing
    fn load_raw(&self, bucket: Bucket) -> Result<BTreeMap<String, Vec<String>>, DbError> {
        let mut lists = BTreeMap::new();
        self.store.for_each(bucket, |key, value| {
            let members: Vec<String> = serde_json::from_slice(value)?;
            lists.insert(key_to_string(key)?, members);
            Ok(())
        })?;
        Ok(lists)
    }
}

// Private helpers for maintaining one side of the index inside a transaction

/// Add `member` to the list stored under `key`, writing only if it changed
fn insert_member(tx: &WriteTx<'_>, bucket: Bucket, key: &str, member: &str) -> TxResult<bool> {
    let mut list = aborting(MemberList::decode_opt(tx.get(bucket, key)?))?;
    if !list.insert(member) {
        return Ok(false);
    }
    tx.put(bucket, key, aborting(list.encode())?)?;
    Ok(true)
}

/// Remove `member` from the list stored under `key`, deleting the key if it empties
fn remove_member(tx: &WriteTx<'_>, bucket: Bucket, key: &str, member: &str) -> TxResult<bool> {
    let Some(value) = tx.get(bucket, key)? else {
        return Ok(false);
    };
    let mut list = aborting(MemberList::decode(&value))?;
    if !list.remove(member) {
        return Ok(false);
    }
    if list.is_empty() {
        tx.delete(bucket, key)?;
    } else {
        tx.put(bucket, key, aborting(list.encode())?)?;
    }
    Ok(true)
}

fn key_to_string(key: &[u8]) -> Result<String, DbError> {
    String::from_utf8(key.to_vec())
        .map_err(|_| DbError::SerializeError("Invalid UTF-8 in stored key".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDb;

    #[test]
    fn test_create_index() {
        let test_db = TestDb::new();
        let index = test_db.index();

        assert!(test_db.path().exists());
        assert_eq!(index.image_count(), 0);
        assert_eq!(index.tag_count(), 0);
    }

    #[test]
    fn test_add_tag_updates_both_sides() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["cat"]);
        assert_eq!(index.get_images("cat").unwrap(), vec![PathBuf::from("/a.jpg")]);
        assert!(index.verify().unwrap().is_empty());
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "cat").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["cat"]);
        assert_eq!(index.get_images("cat").unwrap().len(), 1);
    }

    #[test]
    fn test_add_tag_stores_verbatim_case() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "Cat").unwrap();
        index.add_tag("/a.jpg", "cat").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["Cat", "cat"]);
        assert_eq!(index.tag_count(), 2);
    }

    #[test]
    fn test_empty_arguments_are_rejected() {
        let test_db = TestDb::new();
        let index = test_db.index();

        assert!(index.add_tag("", "cat").unwrap_err().is_validation());
        assert!(index.add_tag("/a.jpg", "").unwrap_err().is_validation());
        assert!(index.remove_tag("", "cat").unwrap_err().is_validation());
        assert!(index.remove_tag("/a.jpg", "").unwrap_err().is_validation());
        assert!(index.remove_all_tags_for_image("").unwrap_err().is_validation());
        assert!(index.delete_orphaned_tag_key("").unwrap_err().is_validation());
        assert_eq!(index.image_count(), 0);
    }

    #[test]
    fn test_results_are_sorted() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/b.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "zoo").unwrap();
        index.add_tag("/a.jpg", "animal").unwrap();

        assert_eq!(
            index.get_images("cat").unwrap(),
            vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")]
        );
        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["animal", "cat", "zoo"]);
    }

    #[test]
    fn test_storage_keeps_insertion_order() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "zoo").unwrap();
        index.add_tag("/a.jpg", "animal").unwrap();

        let raw = index
            .store()
            .get(Bucket::ImagesToTags, b"/a.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(raw.as_ref(), br#"["zoo","animal"]"#);
    }

    #[test]
    fn test_unknown_keys_return_empty() {
        let test_db = TestDb::new();
        let index = test_db.index();

        assert!(index.get_tags("/missing.jpg").unwrap().is_empty());
        assert!(index.get_images("missing").unwrap().is_empty());
    }

    #[test]
    fn test_remove_tag_deletes_emptied_keys() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.remove_tag("/a.jpg", "cat").unwrap();

        assert!(index.get_tags("/a.jpg").unwrap().is_empty());
        assert!(!index.contains("/a.jpg").unwrap());
        assert!(index.get_all_image_paths().unwrap().is_empty());
        assert!(index.get_all_tags().unwrap().is_empty());
    }

    #[test]
    fn test_remove_tag_keeps_other_members() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "pet").unwrap();
        index.add_tag("/b.jpg", "cat").unwrap();
        index.remove_tag("/a.jpg", "cat").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["pet"]);
        assert_eq!(index.get_images("cat").unwrap(), vec![PathBuf::from("/b.jpg")]);
        assert!(index.verify().unwrap().is_empty());
    }

    #[test]
    fn test_remove_absent_tag_is_noop() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.remove_tag("/a.jpg", "dog").unwrap();
        index.remove_tag("/nowhere.jpg", "cat").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["cat"]);
        assert_eq!(index.get_images("cat").unwrap(), vec![PathBuf::from("/a.jpg")]);
    }

    #[test]
    fn test_get_all_tags_counts() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.add_tag("/b.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "pet").unwrap();

        assert_eq!(
            index.get_all_tags().unwrap(),
            vec![TagWithCount::new("cat", 2), TagWithCount::new("pet", 1)]
        );
        assert_eq!(
            index.get_all_image_paths().unwrap(),
            vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")]
        );
    }

    #[test]
    fn test_retag_image_moves_association() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "old").unwrap();
        index.add_tag("/b.jpg", "new").unwrap();
        index.retag_image("/a.jpg", "old", "new").unwrap();

        assert_eq!(index.get_tags("/a.jpg").unwrap(), vec!["new"]);
        assert!(index.get_images("old").unwrap().is_empty());
        assert_eq!(index.get_images("new").unwrap().len(), 2);
        assert!(index.verify().unwrap().is_empty());
    }

    #[test]
    fn test_retag_image_rejects_same_tag() {
        let test_db = TestDb::new();
        let index = test_db.index();

        let err = index.retag_image("/a.jpg", "cat", "cat").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_remove_all_tags_for_image() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index.add_tag("/a.jpg", "cat").unwrap();
        index.add_tag("/a.jpg", "pet").unwrap();
        index.add_tag("/b.jpg", "cat").unwrap();

        assert_eq!(index.remove_all_tags_for_image("/a.jpg").unwrap(), 2);

        assert!(!index.contains("/a.jpg").unwrap());
        assert_eq!(index.get_images("cat").unwrap(), vec![PathBuf::from("/b.jpg")]);
        assert_eq!(index.get_all_tags().unwrap(), vec![TagWithCount::new("cat", 1)]);
        assert!(index.verify().unwrap().is_empty());
    }

    #[test]
    fn test_remove_all_tags_for_unknown_image() {
        let test_db = TestDb::new();
        let index = test_db.index();

        assert_eq!(index.remove_all_tags_for_image("/none.jpg").unwrap(), 0);
    }

    #[test]
    fn test_delete_orphaned_tag_key() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index
            .store()
            .write(|tx| tx.put(Bucket::TagsToImages, "ghost", b"[]".to_vec()))
            .unwrap();
        assert_eq!(index.get_all_tags().unwrap(), vec![TagWithCount::new("ghost", 0)]);

        assert!(index.delete_orphaned_tag_key("ghost").unwrap());
        assert!(!index.delete_orphaned_tag_key("ghost").unwrap());
        assert!(index.get_all_tags().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_value_rolls_back_whole_transaction() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index
            .store()
            .write(|tx| tx.put(Bucket::TagsToImages, "cat", b"not json".to_vec()))
            .unwrap();

        let err = index.add_tag("/a.jpg", "cat").unwrap_err();
        assert!(matches!(err, DbError::CodecError(_)));
        assert!(err.is_storage());
        // forward side was written first inside the transaction and must be gone
        assert!(!index.contains("/a.jpg").unwrap());
    }

    #[test]
    fn test_verify_reports_one_sided_entries() {
        let test_db = TestDb::new();
        let index = test_db.index();

        index
            .store()
            .write(|tx| {
                tx.put(Bucket::ImagesToTags, "/a.jpg", br#"["cat","cat"]"#.to_vec())?;
                tx.put(Bucket::TagsToImages, "dog", br#"["/b.jpg"]"#.to_vec())?;
                tx.put(Bucket::TagsToImages, "empty", b"[]".to_vec())
            })
            .unwrap();

        let issues = index.verify().unwrap();
        assert!(issues.contains(&Inconsistency::MissingImage {
            path: "/a.jpg".into(),
            tag: "cat".into()
        }));
        assert!(issues.contains(&Inconsistency::MissingTag {
            tag: "dog".into(),
            path: "/b.jpg".into()
        }));
        assert!(issues.contains(&Inconsistency::EmptyKey {
            side: Side::Tags,
            key: "empty".into()
        }));
        assert!(issues.contains(&Inconsistency::DuplicateMember {
            side: Side::Images,
            key: "/a.jpg".into(),
            member: "cat".into()
        }));
    }

    #[test]
    fn test_reopen_existing_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index");

        {
            let index = TagIndex::open(&path).unwrap();
            index.add_tag("/persistent.jpg", "saved").unwrap();
            index.close().unwrap();
        }

        let index = TagIndex::open(&path).unwrap();
        assert_eq!(index.image_count(), 1);
        assert_eq!(index.get_tags("/persistent.jpg").unwrap(), vec!["saved"]);
    }

    #[test]
    fn test_concurrent_adds_on_same_tag_lose_nothing() {
        let test_db = TestDb::new();
        let index = test_db.index();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                scope.spawn(move || {
                    for i in 0..25 {
                        index.add_tag(format!("/w{worker}/{i}.jpg"), "shared").unwrap();
                    }
                });
            }
        });

        assert_eq!(index.get_images("shared").unwrap().len(), 100);
        assert_eq!(index.image_count(), 100);
        assert!(index.verify().unwrap().is_empty());
    }
}
