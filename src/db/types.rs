//! Type wrappers for index keys and values
//!
//! This module provides the types stored in and returned from the index.
//!
//! # Types
//!
//! - **`PathString`**: Wrapper that guarantees an image path is non-empty, valid UTF-8
//! - **`MemberList`**: The set stored under every key, encoded as a JSON array of strings
//! - **`TagWithCount`**: A tag name with the number of images carrying it
//! - **`Inconsistency`**: A violation of the index invariants found by an audit
//!
//! # Examples
//!
//! ```
//! use pictag::db::types::{MemberList, PathString};
//!
//! let path = PathString::new("/photos/cat.jpg").unwrap();
//! assert_eq!(&*path, "/photos/cat.jpg");
//!
//! let mut members = MemberList::default();
//! assert!(members.insert("cat"));
//! assert!(!members.insert("cat"));
//! assert_eq!(members.encode().unwrap(), br#"["cat"]"#);
//! ```

use super::error::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Wrapper for an image path that guarantees a non-empty UTF-8 string representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathString(String);

impl PathString {
    /// # Errors
    ///
    /// Returns `DbError::Validation` if the path is empty or contains invalid UTF-8.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref();
        let s = path.to_str().ok_or_else(|| {
            DbError::validation(format!("Invalid UTF-8 in path: {}", path.display()))
        })?;
        if s.is_empty() {
            return Err(DbError::validation("image path must not be empty"));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PathString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for PathString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Reject empty tags before any transaction begins.
///
/// # Errors
///
/// Returns `DbError::Validation` if `tag` is empty.
pub fn validate_tag(tag: &str) -> Result<&str, DbError> {
    if tag.is_empty() {
        return Err(DbError::validation("tag must not be empty"));
    }
    Ok(tag)
}

/// Ordered set of strings stored as the value of an index key.
///
/// Members keep insertion order on disk. Decoding drops duplicates so a
/// hand-edited or damaged list still behaves as a set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberList(Vec<String>);

impl MemberList {
    /// Decode a stored value
    ///
    /// # Errors
    ///
    /// Returns `DbError::CodecError` if the bytes are not a JSON array of strings.
    pub fn decode(bytes: &[u8]) -> Result<Self, DbError> {
        let raw: Vec<String> = serde_json::from_slice(bytes)?;
        let mut list = Self(Vec::with_capacity(raw.len()));
        for member in raw {
            list.insert(&member);
        }
        Ok(list)
    }

    /// Decode an optional stored value; an absent key is the empty set
    ///
    /// # Errors
    ///
    /// Returns `DbError::CodecError` if a present value cannot be decoded.
    pub fn decode_opt<B: AsRef<[u8]>>(value: Option<B>) -> Result<Self, DbError> {
        value.map_or_else(|| Ok(Self::default()), |v| Self::decode(v.as_ref()))
    }

    /// # Errors
    ///
    /// Returns `DbError::CodecError` if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, DbError> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    /// Add a member; returns false if it was already present
    pub fn insert(&mut self, member: &str) -> bool {
        if self.contains(member) {
            return false;
        }
        self.0.push(member.to_string());
        true
    }

    /// Remove a member; returns false if it was absent
    pub fn remove(&mut self, member: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m != member);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.0.iter().any(|m| m == member)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Consume the list, returning its members in lexicographic order
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<String> {
        self.0.sort();
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for MemberList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::default();
        for member in iter {
            let member: String = member.into();
            list.insert(&member);
        }
        list
    }
}

/// A tag and the number of images it is attached to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagWithCount {
    pub tag: String,
    pub count: usize,
}

impl TagWithCount {
    #[must_use]
    pub fn new(tag: impl Into<String>, count: usize) -> Self {
        Self {
            tag: tag.into(),
            count,
        }
    }
}

/// Which side of the index an inconsistency was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Images,
    Tags,
}

/// A single invariant violation reported by `TagIndex::verify`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// `tag` is listed for `path` but `path` is missing from the tag's list
    MissingImage { path: String, tag: String },
    /// `path` is listed for `tag` but `tag` is missing from the image's list
    MissingTag { tag: String, path: String },
    /// A key is stored with an empty member list
    EmptyKey { side: Side, key: String },
    /// A stored list contains the same member more than once
    DuplicateMember { side: Side, key: String, member: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImage { path, tag } => {
                write!(f, "'{path}' has tag '{tag}' but the tag does not list it")
            }
            Self::MissingTag { tag, path } => {
                write!(f, "tag '{tag}' lists '{path}' but the image does not carry it")
            }
            Self::EmptyKey { side, key } => write!(f, "{side:?} key '{key}' maps to an empty list"),
            Self::DuplicateMember { side, key, member } => {
                write!(f, "{side:?} key '{key}' lists '{member}' more than once")
            }
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
