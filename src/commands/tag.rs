//! Tag, untag and show commands

use super::{Context, existing_path, resolve_path};
use crate::orchestrator::TagOrchestrator;
use crate::scanner::FileScanner;
use crate::{PictagError, db::TagIndex, output};
use std::path::Path;

type Result<T> = std::result::Result<T, PictagError>;

/// Execute the tag command - add tags to an image
///
/// # Errors
/// Returns an error if the file cannot be accessed or an index operation fails
pub fn execute<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    file: &Path,
    tags: &[String],
    ctx: Context,
) -> Result<()> {
    let fullpath = existing_path(file)?;
    orchestrator.add_tags_to_image(&fullpath, tags)?;
    if !ctx.quiet {
        println!(
            "Tagged {} with: {}",
            output::format_path(&fullpath, ctx.path_format),
            tags.join(", ")
        );
    }
    Ok(())
}

/// Execute the untag command - remove tags from an image
///
/// The image does not need to exist on disk.
///
/// # Errors
/// Returns an error if an index operation fails
pub fn untag<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    file: &Path,
    tags: &[String],
    ctx: Context,
) -> Result<()> {
    let fullpath = resolve_path(file)?;
    orchestrator.remove_tags_from_image(&fullpath, tags)?;
    if !ctx.quiet {
        println!(
            "Removed tags {} from {}",
            tags.join(", "),
            output::format_path(&fullpath, ctx.path_format)
        );
    }
    Ok(())
}

/// Execute the show command - print the tags of an image
///
/// # Errors
/// Returns an error if the lookup fails
pub fn show(index: &TagIndex, file: &Path, ctx: Context) -> Result<()> {
    let fullpath = resolve_path(file)?;
    let tags = index.get_tags(&fullpath)?;
    println!(
        "{}",
        output::image_with_tags(&fullpath, &tags, ctx.path_format, ctx.quiet)
    );
    Ok(())
}
