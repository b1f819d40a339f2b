//! Cornell-layout PDF export.
//!
//! Pages are laid out into a recorded [`Canvas`] by the [`LayoutEngine`] and
//! then serialised with `pdf-writer`.

mod canvas;
mod document;
mod fonts;
mod layout;
mod options;
mod writer;

pub use canvas::{Canvas, Color, DrawOp, Page, RasterImage};
pub use document::{PageLayout, PdfExport, SectionSpan, export_pdf, layout_document};
pub use fonts::{BuiltinFont, FontFamily, FontStyle, ParseFontStyleError, wrap_text};
pub use layout::{Column, Cursor, FontSet, LayoutEngine};
pub use options::PdfLayout;
