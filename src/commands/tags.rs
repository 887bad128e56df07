//! Tags commands - global tag management

use super::{Context, confirm};
use crate::orchestrator::TagOrchestrator;
use crate::scanner::FileScanner;
use crate::{PictagError, output};

type Result<T> = std::result::Result<T, PictagError>;

/// Rename `old` to `new` on every image
///
/// # Errors
/// Returns an error for invalid tags, or `PictagError::PartialBatch` if some
/// images could not be retagged
pub fn rename<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    old: &str,
    new: &str,
    ctx: Context,
) -> Result<()> {
    let outcome = orchestrator.replace_tag(old, new)?;
    if outcome.processed == 0 {
        if !ctx.quiet {
            println!("Tag '{old}' not found in index.");
        }
        return Ok(());
    }
    output::print_outcome(&format!("Renamed '{old}' to '{new}'"), &outcome, ctx.quiet);
    outcome.into_result().map(|_| ())
}

/// Lower-case every tag after confirmation
///
/// # Errors
/// Returns an error if the tags cannot be listed or the prompt fails, or
/// `PictagError::PartialBatch` if some images could not be retagged
pub fn normalize<S: FileScanner>(orchestrator: &TagOrchestrator<'_, S>, ctx: Context) -> Result<()> {
    let pending: Vec<String> = orchestrator
        .index()
        .get_all_tags()?
        .into_iter()
        .filter(|t| t.tag.to_lowercase() != t.tag)
        .map(|t| t.tag)
        .collect();

    if pending.is_empty() {
        if !ctx.quiet {
            println!("All tags are already lower case.");
        }
        return Ok(());
    }

    if !ctx.quiet {
        println!("Tags to normalize:");
        for tag in &pending {
            println!("  {tag} -> {}", tag.to_lowercase());
        }
    }
    if !confirm(&format!("Normalize {} tag(s)?", pending.len()), ctx)? {
        if !ctx.quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let outcome = orchestrator.normalize_all_tags()?;
    output::print_outcome("Normalized", &outcome, ctx.quiet);
    outcome.into_result().map(|_| ())
}

/// Remove a tag from every image after confirmation
///
/// # Errors
/// Returns an error if the tag is invalid or the prompt fails, or
/// `PictagError::PartialBatch` if some images could not be untagged
pub fn remove_globally<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    tag: &str,
    ctx: Context,
) -> Result<()> {
    let count = orchestrator.index().get_images(tag)?.len();
    if count == 0 {
        if !ctx.quiet {
            println!("Tag '{tag}' not found in index.");
        }
        return Ok(());
    }

    if !confirm(&format!("Remove tag '{tag}' from {count} image(s)?"), ctx)? {
        if !ctx.quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let outcome = orchestrator.remove_tag_globally(tag)?;
    output::print_outcome(&format!("Removed '{tag}'"), &outcome, ctx.quiet);
    outcome.into_result().map(|_| ())
}
