//! Core types: Document, Section, Block, image references and link tokens

mod block;
mod document;
mod image;
mod inline;
mod link;

pub use block::{Alignment, Block, Table, parse_blocks};
pub use document::{Document, Section, split_sections};
pub use image::{ImagePayload, ImageSource, STORE_PREFIX, mime_extension, sniff_mime};
pub use inline::strip_inline;
pub use link::extract_links;
