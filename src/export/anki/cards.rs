//! One flashcard per section.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::domain::{Document, ImagePayload};
use crate::export::ExportError;
use crate::export::anki::html::content_to_html;
use crate::infra::ImageResolver;

/// A question/answer pair. The back is HTML; `images` holds the media
/// files it refers to by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashCard {
    pub front: String,
    pub back: String,
    #[serde(skip)]
    pub images: BTreeMap<String, ImagePayload>,
}

/// Builds the cards for a note.
///
/// When the note has a summary, a summary card titled `"<title> - Summary"`
/// comes first. Each non-blank section then becomes one card with the
/// heading on the front.
///
/// # Errors
///
/// Returns `ExportError::NoSections` if no section has content.
pub fn build_flashcards(
    doc: &Document,
    resolver: &dyn ImageResolver,
) -> Result<Vec<FlashCard>, ExportError> {
    let sections = doc.renderable_sections();
    if sections.is_empty() {
        return Err(ExportError::NoSections);
    }

    let mut cards = Vec::with_capacity(sections.len() + 1);
    if doc.has_summary() {
        let back = content_to_html(&doc.summary, resolver);
        cards.push(FlashCard {
            front: format!("{} - Summary", doc.title),
            back: back.html,
            images: back.images,
        });
    }

    for section in &sections {
        let back = content_to_html(&section.content, resolver);
        debug!(
            "card '{}': {} bytes of html, {} images",
            section.heading,
            back.html.len(),
            back.images.len()
        );
        cards.push(FlashCard {
            front: section.heading.clone(),
            back: back.html,
            images: back.images,
        });
    }
    Ok(cards)
}
