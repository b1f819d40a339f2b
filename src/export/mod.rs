//! Export of notes to printable and study formats.
//!
//! Two exporters share the section splitter and block parser:
//! a Cornell-layout PDF ([`pdf`]) and an Anki flashcard package ([`anki`]).

pub mod anki;
mod error;
pub mod pdf;

pub use anki::{FlashCard, FlashcardPackage, build_flashcards, export_flashcards};
pub use error::ExportError;
pub use pdf::{FontStyle, PdfExport, PdfLayout, SectionSpan, export_pdf};
