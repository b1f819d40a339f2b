//! Handler for the `links` command.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::LinksArgs;
use crate::domain::extract_links;
use crate::infra::read_document;

use super::{print_output, resolve_note_path};

/// Handle the `links` command.
///
/// Prints each distinct `[[Title]]` reference once, in order of first use.
pub fn handle_links(args: &LinksArgs, notes_dir: &Path) -> Result<()> {
    let path = resolve_note_path(&args.note, notes_dir)?;
    let doc = read_document(&path)
        .with_context(|| format!("failed to read note: {}", path.display()))?;

    let links = extract_links(&doc.body);
    let human = links.join("\n");
    print_output(args.format, &links, &human, &links)
}
