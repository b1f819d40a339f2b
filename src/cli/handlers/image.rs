//! Handler for the `image` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::ImageAddArgs;
use crate::cli::config::Config;
use crate::cli::output::ImageListing;
use crate::domain::sniff_mime;
use crate::infra::DirImageStore;

use super::print_output;

/// Handle the `image add` command.
pub fn handle_image_add(args: &ImageAddArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read image: {}", args.file.display()))?;
    if sniff_mime(&bytes).is_none() {
        bail!("not a recognised image file: {}", args.file.display());
    }

    let store = DirImageStore::new(config.images_dir(args.images.as_ref(), notes_dir));
    let id = store
        .add(&bytes)
        .with_context(|| format!("failed to store image in {}", store.root().display()))?;
    let stored = store
        .find(id.as_str())?
        .with_context(|| format!("stored image {} not found", id))?;

    let listing = ImageListing {
        id: id.to_string(),
        path: stored.display().to_string(),
        markdown: format!("![]({})", id.reference()),
    };
    let human = format!("Stored {}\n{}", listing.id, listing.markdown);
    let paths = [listing.path.clone()];
    print_output(args.format, listing, &human, &paths)
}
