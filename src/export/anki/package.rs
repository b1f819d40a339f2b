//! Zip package with the card file, media and an import guide.
//!
//! Layout of the archive:
//! ```text
//! cards.txt        tab-separated front/back lines, Anki header directives
//! images/<name>    every media file referenced by a card
//! README.txt       import instructions
//! ```

use std::collections::BTreeMap;
use std::io::{Cursor, Write as IoWrite};

use log::{debug, warn};
use minijinja::{Environment, context};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::{Document, ImagePayload};
use crate::export::ExportError;
use crate::export::anki::cards::{FlashCard, build_flashcards};
use crate::export::error::RenderError;
use crate::infra::ImageResolver;

pub const CARDS_FILE: &str = "cards.txt";
pub const README_FILE: &str = "README.txt";
pub const IMAGES_DIR: &str = "images/";

const FORMAT: &str = "flashcard package";

const README_TEMPLATE: &str = r#"{{ title }} - flashcards
{{ underline }}

This package holds {{ card_count }} card{% if card_count != 1 %}s{% endif %}
{%- if image_count %} and {{ image_count }} image{% if image_count != 1 %}s{% endif %}{% endif %}.

Importing into Anki
-------------------
1. Open Anki and choose File > Import.
2. Select cards.txt from this package.
3. Check that the field separator is Tab and that "Allow HTML in fields" is on.
4. Map field 1 to Front and field 2 to Back, pick a deck, then import.
{% if image_count %}
Images
------
Copy every file from the images/ folder into your Anki profile's
collection.media folder before reviewing, or the pictures will not show.
{% endif %}"#;

/// A finished flashcard archive.
#[derive(Debug, Clone)]
pub struct FlashcardPackage {
    pub bytes: Vec<u8>,
    pub card_count: usize,
    pub image_count: usize,
}

/// Builds the cards for a note and packages them.
///
/// # Errors
///
/// Returns `ExportError::NoSections` if the note has no card to offer and
/// `ExportError::Generation` if the archive cannot be written.
pub fn export_flashcards(
    doc: &Document,
    resolver: &dyn ImageResolver,
) -> Result<FlashcardPackage, ExportError> {
    let cards = build_flashcards(doc, resolver)?;
    package_flashcards(&doc.title, &cards)
}

/// Packages cards into a zip archive.
///
/// # Errors
///
/// Returns `ExportError::NoSections` if `cards` is empty and
/// `ExportError::Generation` if the archive cannot be written.
pub fn package_flashcards(
    title: &str,
    cards: &[FlashCard],
) -> Result<FlashcardPackage, ExportError> {
    if cards.is_empty() {
        return Err(ExportError::NoSections);
    }
    write_package(title, cards).map_err(|e| e.into_export(FORMAT))
}

fn write_package(title: &str, cards: &[FlashCard]) -> Result<FlashcardPackage, RenderError> {
    let mut images: BTreeMap<&str, &ImagePayload> = BTreeMap::new();
    for card in cards {
        for (name, payload) in &card.images {
            images.insert(name, payload);
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(CARDS_FILE, options)?;
    zip.write_all(cards_tsv(cards).as_bytes())?;

    let mut image_count = 0;
    for (name, payload) in &images {
        if payload.bytes.is_empty() {
            warn!("omitting empty image {}", name);
            continue;
        }
        zip.start_file(format!("{IMAGES_DIR}{name}"), options)?;
        zip.write_all(&payload.bytes)?;
        image_count += 1;
    }

    zip.start_file(README_FILE, options)?;
    zip.write_all(readme(title, cards.len(), image_count)?.as_bytes())?;

    let bytes = zip.finish()?.into_inner();
    debug!(
        "packaged {} cards and {} images ({} bytes)",
        cards.len(),
        image_count,
        bytes.len()
    );
    Ok(FlashcardPackage {
        bytes,
        card_count: cards.len(),
        image_count,
    })
}

/// Renders the card file: header directives, then one `front\tback` line per card.
pub fn cards_tsv(cards: &[FlashCard]) -> String {
    let mut out = String::from("#separator:tab\n#html:true\n");
    for card in cards {
        let front: String = card
            .front
            .chars()
            .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
            .collect();
        let back: String = card
            .back
            .chars()
            .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
            .collect();
        out.push_str(&front);
        out.push('\t');
        out.push_str(&back);
        out.push('\n');
    }
    out
}

fn readme(title: &str, card_count: usize, image_count: usize) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.add_template("readme", README_TEMPLATE)?;
    let tmpl = env.get_template("readme")?;
    let heading = format!("{title} - flashcards");
    let text = tmpl.render(context! {
        title => title,
        underline => "=".repeat(heading.chars().count()),
        card_count => card_count,
        image_count => image_count,
    })?;
    Ok(text)
}
