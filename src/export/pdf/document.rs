//! Assembles a whole note into Cornell-layout pages.
//!
//! The header (title, summary, rule) spans the full width. Each non-blank
//! section puts its heading in the key-point column and its blocks in the
//! notes column, followed by its images. Column dividers, section rules and
//! continuation labels are drawn afterwards from the recorded section spans.

use log::{debug, warn};
use serde::Serialize;

use crate::domain::{
    Block, Document, ImagePayload, ImageSource, Section, extract_links, parse_blocks,
    strip_inline,
};
use crate::export::ExportError;
use crate::export::error::RenderError;
use crate::export::pdf::canvas::{Canvas, Color};
use crate::export::pdf::fonts::{FontStyle, wrap_text};
use crate::export::pdf::layout::{Cursor, LayoutEngine};
use crate::export::pdf::options::PdfLayout;
use crate::export::pdf::writer::write_pdf;
use crate::infra::ImageResolver;

const RELATED_NOTES: &str = "Related Notes";
const CONTINUED: &str = "(cont.)";

/// Where a section was drawn, from its heading to its last content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSpan {
    /// Position among the rendered sections.
    pub index: usize,
    pub heading: String,
    pub start_page: usize,
    pub start_y: f32,
    pub end_page: usize,
    pub end_y: f32,
}

/// Laid-out pages before serialisation.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub canvas: Canvas,
    pub spans: Vec<SectionSpan>,
}

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub spans: Vec<SectionSpan>,
}

/// Exports a note as a Cornell-layout PDF.
///
/// # Errors
///
/// Returns `ExportError::InvalidLayout` if the page geometry is unusable,
/// `ExportError::NoSections` if no `# ` section has content, and
/// `ExportError::Generation` for any failure while producing the bytes.
pub fn export_pdf(
    doc: &Document,
    resolver: &dyn ImageResolver,
    layout: &PdfLayout,
    style: FontStyle,
) -> Result<PdfExport, ExportError> {
    let pages = layout_document(doc, resolver, layout, style)?;
    let bytes = write_pdf(&pages.canvas, &doc.title).map_err(|e| e.into_export("PDF"))?;
    Ok(PdfExport {
        bytes,
        page_count: pages.canvas.page_count(),
        spans: pages.spans,
    })
}

/// Lays out a note without serialising it.
///
/// # Errors
///
/// Same as [`export_pdf`].
pub fn layout_document(
    doc: &Document,
    resolver: &dyn ImageResolver,
    layout: &PdfLayout,
    style: FontStyle,
) -> Result<PageLayout, ExportError> {
    layout.validate()?;
    let sections = doc.renderable_sections();
    if sections.is_empty() {
        return Err(ExportError::NoSections);
    }
    assemble(doc, &sections, resolver, layout, style).map_err(|e| e.into_export("PDF"))
}

fn assemble(
    doc: &Document,
    sections: &[Section],
    resolver: &dyn ImageResolver,
    layout: &PdfLayout,
    style: FontStyle,
) -> Result<PageLayout, RenderError> {
    let mut engine = LayoutEngine::new(layout, style);
    write_header(&mut engine, doc);

    let last = sections.len() - 1;
    let spans: Vec<SectionSpan> = sections
        .iter()
        .enumerate()
        .map(|(index, section)| render_section(&mut engine, index, section, index == last, resolver))
        .collect();

    let links = extract_links(&doc.body);
    if !links.is_empty() {
        related_notes(&mut engine, links);
    }

    decorate_spans(&mut engine, &spans);

    let canvas = engine.into_canvas();
    if canvas.pages.iter().all(|p| p.ops.is_empty()) {
        return Err(RenderError::Layout("nothing was drawn".into()));
    }
    debug!(
        "laid out '{}': {} sections on {} pages",
        doc.title,
        spans.len(),
        canvas.page_count()
    );
    Ok(PageLayout { canvas, spans })
}

fn write_header(engine: &mut LayoutEngine, doc: &Document) {
    let config = engine.config().clone();
    let fonts = engine.fonts();
    let full = engine.full_column();

    engine.write_text(&doc.title, full, fonts.title, config.title_size, Color::BLACK);
    if doc.has_summary() {
        engine.advance(config.block_spacing);
        engine.write_text(
            &strip_inline(doc.summary.trim()),
            full,
            fonts.body,
            config.body_size,
            Color::MUTED,
        );
    }
    engine.advance(config.block_spacing);
    let Cursor { page, y } = engine.cursor();
    engine.line(page, full.x, y, full.x + full.width, y, Color::BLACK);
    engine.advance(config.section_spacing);
}

fn render_section(
    engine: &mut LayoutEngine,
    index: usize,
    section: &Section,
    is_last: bool,
    resolver: &dyn ImageResolver,
) -> SectionSpan {
    let config = engine.config().clone();
    let fonts = engine.fonts();
    engine.begin_section(is_last);

    let first_line = config
        .line_height(config.key_heading_size)
        .max(config.line_height(config.body_size));
    engine.ensure_space(first_line);
    let start = engine.cursor();

    let key = engine.key_column();
    let heading_end = engine.write_text(
        &strip_inline(&section.heading),
        key,
        fonts.heading,
        config.key_heading_size,
        Color::BLACK,
    );
    engine.set_cursor(start);

    let blocks = parse_blocks(&section.content);
    let notes = engine.notes_column();
    for block in blocks.iter().filter(|b| !b.is_image()) {
        engine.render_block(block, notes);
    }

    let mut placed = 0;
    for block in &blocks {
        let Block::Image { source, .. } = block else {
            continue;
        };
        if let Some(payload) = load_image(source, resolver)
            && engine.place_image(&payload, notes).is_some()
        {
            placed += 1;
        }
    }

    let body_end = engine.cursor();
    let end = if heading_end > body_end {
        heading_end
    } else {
        body_end
    };
    engine.set_cursor(end);
    engine.end_section();
    engine.advance(config.section_spacing);

    debug!(
        "section {} '{}': {} blocks, {} images, pages {}-{}",
        index,
        section.heading,
        blocks.len(),
        placed,
        start.page + 1,
        end.page + 1
    );
    SectionSpan {
        index,
        heading: section.heading.clone(),
        start_page: start.page,
        start_y: start.y,
        end_page: end.page,
        end_y: end.y,
    }
}

/// Loads image bytes for embedding. Placeholders are never embedded.
fn load_image(source: &str, resolver: &dyn ImageResolver) -> Option<ImagePayload> {
    let payload = match ImageSource::parse(source) {
        ImageSource::Data(uri) => ImagePayload::from_data_uri(&uri),
        ImageSource::Store(id) => resolver.resolve(&id),
        ImageSource::Url(url) => resolver.fetch(&url),
        ImageSource::Placeholder => return None,
    };
    if payload.is_none() {
        warn!("skipping unresolved image {}", abbreviate(source));
    }
    payload
}

fn abbreviate(source: &str) -> String {
    const MAX: usize = 48;
    if source.chars().count() <= MAX {
        return source.to_string();
    }
    let head: String = source.chars().take(MAX).collect();
    format!("{head}...")
}

/// Lists linked notes in the notes column, clear of any column divider.
fn related_notes(engine: &mut LayoutEngine, links: Vec<String>) {
    let notes = engine.notes_column();
    let heading = Block::Heading {
        level: 2,
        text: RELATED_NOTES.to_string(),
    };
    engine.render_block(&heading, notes);
    engine.render_block(&Block::UnorderedList { items: links }, notes);
}

/// Draws column dividers, section rules and continuation labels.
fn decorate_spans(engine: &mut LayoutEngine, spans: &[SectionSpan]) {
    let config = engine.config().clone();
    let fonts = engine.fonts();
    let divider_x = engine.divider_x();
    let key = engine.key_column();
    let full = engine.full_column();
    let full_dividers = engine.full_dividers().clone();

    for (i, span) in spans.iter().enumerate() {
        for page in span.start_page..=span.end_page {
            if full_dividers.contains(&page) {
                continue;
            }
            let top = if page == span.start_page {
                span.start_y
            } else {
                config.margin
            };
            let bottom = if page == span.end_page {
                span.end_y
            } else {
                config.bottom()
            };
            if bottom > top {
                engine.line(page, divider_x, top, divider_x, bottom, Color::RULE);
            }
        }

        if i + 1 < spans.len() {
            let y = (span.end_y + config.section_spacing / 2.0).min(config.bottom());
            engine.line(span.end_page, full.x, y, full.x + full.width, y, Color::RULE);
        }

        let label = format!("{} {}", strip_inline(&span.heading), CONTINUED);
        let size = config.small_size;
        let lines = wrap_text(&label, fonts.italic, size, key.width);
        for page in span.start_page + 1..=span.end_page {
            for (k, line) in lines.iter().enumerate() {
                let baseline = config.margin + k as f32 * config.line_height(size) + size;
                engine.text(page, key.x, baseline, fonts.italic, size, Color::MUTED, line);
            }
        }
    }
}
