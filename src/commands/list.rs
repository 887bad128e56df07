//! List command - list images or tags in the index

use super::Context;
use crate::{PictagError, cli::ListVariant, db::TagIndex, output};

type Result<T> = std::result::Result<T, PictagError>;

/// Execute the list command
///
/// # Errors
/// Returns an error if the index cannot be read
pub fn execute(index: &TagIndex, variant: ListVariant, ctx: Context) -> Result<()> {
    match variant {
        ListVariant::Images => list_images(index, ctx),
        ListVariant::Tags => list_tags(index, ctx.quiet),
    }
}

fn list_images(index: &TagIndex, ctx: Context) -> Result<()> {
    let paths = index.get_all_image_paths()?;

    if paths.is_empty() {
        if !ctx.quiet {
            println!("No images found in index.");
        }
        return Ok(());
    }

    if !ctx.quiet {
        println!("Images in index:");
    }
    for path in paths {
        if ctx.quiet {
            println!("{}", output::format_path(&path, ctx.path_format));
        } else {
            let tags = index.get_tags(&path)?;
            println!(
                "  {}",
                output::image_with_tags(&path, &tags, ctx.path_format, false)
            );
        }
    }
    Ok(())
}

fn list_tags(index: &TagIndex, quiet: bool) -> Result<()> {
    let tags = index.get_all_tags()?;

    if tags.is_empty() {
        if !quiet {
            println!("No tags found in index.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags in index:");
    }
    for entry in tags {
        println!("{}", output::tag_with_count(&entry.tag, entry.count, quiet));
    }
    Ok(())
}
