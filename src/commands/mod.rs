//! Command implementations
//!
//! Each command is a module with execute functions that take parsed CLI args
//! and run the operation against the index or the orchestrator.

pub mod batch;
pub mod cleanup;
pub mod list;
pub mod search;
pub mod tag;
pub mod tags;

use std::path::{Path, PathBuf};

use dialoguer::Confirm;

use crate::PictagError;
use crate::config::PathFormat;

type Result<T> = std::result::Result<T, PictagError>;

/// Output settings shared by every command
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub path_format: PathFormat,
    pub quiet: bool,
    /// Skip confirmation prompts
    pub yes: bool,
}

/// Ask before a destructive operation, unless `--yes` was given
///
/// # Errors
/// Returns an error if the prompt cannot be shown.
pub fn confirm(prompt: &str, ctx: Context) -> Result<bool> {
    if ctx.yes {
        return Ok(true);
    }

    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PictagError::InvalidInput(format!("Confirmation failed: {e}")))
}

/// Absolute form of a user-supplied path
///
/// Existing files are canonicalized; paths that no longer exist are only
/// made absolute so their stale index entries can still be addressed.
///
/// # Errors
/// Returns an error if the current directory cannot be read.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    match path.canonicalize() {
        Ok(full) => Ok(full),
        Err(_) => Ok(std::path::absolute(path)?),
    }
}

/// Canonical path of a file that must exist
///
/// # Errors
/// Returns `PictagError::InvalidInput` if the file cannot be accessed.
pub fn existing_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        PictagError::InvalidInput(format!("Cannot access path '{}': {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ImageDir;

    #[test]
    fn test_resolve_missing_path_is_absolute() {
        let resolved = resolve_path(Path::new("no/such/image.jpg")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("no/such/image.jpg"));
    }

    #[test]
    fn test_existing_path() {
        let dir = ImageDir::new(&["a.jpg"]);
        assert!(existing_path(&dir.file("a.jpg")).unwrap().is_absolute());

        let err = existing_path(&dir.file("missing.jpg")).unwrap_err();
        assert!(matches!(err, PictagError::InvalidInput(_)));
    }

    #[test]
    fn test_confirm_skipped_with_yes() {
        let ctx = Context {
            path_format: PathFormat::Absolute,
            quiet: true,
            yes: true,
        };
        assert!(confirm("Delete everything?", ctx).unwrap());
    }
}
