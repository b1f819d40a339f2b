//! Handler for the `sections` command.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::SectionsArgs;
use crate::cli::output::SectionListing;
use crate::domain::parse_blocks;
use crate::infra::read_document;

use super::{print_output, resolve_note_path};

/// Handle the `sections` command.
pub fn handle_sections(args: &SectionsArgs, notes_dir: &Path) -> Result<()> {
    let path = resolve_note_path(&args.note, notes_dir)?;
    let doc = read_document(&path)
        .with_context(|| format!("failed to read note: {}", path.display()))?;

    let listings: Vec<SectionListing> = doc
        .sections()
        .iter()
        .enumerate()
        .map(|(index, section)| SectionListing {
            index: index + 1,
            heading: section.heading.clone(),
            blank: section.is_blank(),
            blocks: parse_blocks(&section.content)
                .iter()
                .map(|b| b.kind())
                .collect(),
        })
        .collect();

    let mut human = vec![doc.title.clone()];
    if listings.is_empty() {
        human.push("  (no sections: add a '# Heading' line)".to_string());
    }
    for listing in &listings {
        let detail = if listing.blank {
            "(blank)".to_string()
        } else {
            format!("[{}]", listing.blocks.join(", "))
        };
        human.push(format!(
            "  {:>2}. {}  {}",
            listing.index, listing.heading, detail
        ));
    }

    let paths = [path.display().to_string()];
    print_output(args.format, &listings, &human.join("\n"), &paths)
}
