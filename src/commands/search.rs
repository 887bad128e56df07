//! Search command - find images by tag

use super::Context;
use crate::{PictagError, db::TagIndex, output};

type Result<T> = std::result::Result<T, PictagError>;

/// Execute the search command
///
/// Missing files are shown in red.
///
/// # Errors
/// Returns an error if the tag is empty or the lookup fails
pub fn execute(index: &TagIndex, tag: &str, ctx: Context) -> Result<()> {
    let images = index.get_images(tag)?;

    if images.is_empty() {
        if !ctx.quiet {
            println!("No images found with tag '{tag}'.");
        }
        return Ok(());
    }

    if !ctx.quiet {
        println!("Images tagged '{tag}':");
    }
    for image in &images {
        if ctx.quiet {
            println!("{}", output::format_path(image, ctx.path_format));
        } else {
            println!("  {}", output::colorize_path(image, ctx.path_format));
        }
    }
    Ok(())
}
