//! Flashcard export: one card per section, packaged for Anki import.

mod cards;
mod html;
mod package;

pub use cards::{FlashCard, build_flashcards};
pub use html::{CardHtml, content_to_html, escape, inline, normalize};
pub use package::{
    CARDS_FILE, FlashcardPackage, IMAGES_DIR, README_FILE, cards_tsv, export_flashcards,
    package_flashcards,
};
