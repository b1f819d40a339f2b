//! Cursor-tracking block renderer for the Cornell page.
//!
//! The engine owns the canvas and the cursor for one export. Every render
//! call checks for a page break before each line, row or image and returns
//! the cursor it leaves behind. Content is never dropped by pagination; a
//! block that does not fit continues on the next page.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use crate::domain::{Alignment, Block, ImagePayload, Table, strip_inline};
use crate::export::pdf::canvas::{Canvas, Color, DrawOp, RasterImage};
use crate::export::pdf::fonts::{BuiltinFont, FontStyle, wrap_text};
use crate::export::pdf::options::PdfLayout;

const RULE_WIDTH: f32 = 0.5;
const BULLET: &str = "\u{2022}";

/// Position of the next draw: page index and top-down y.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Cursor {
    pub page: usize,
    pub y: f32,
}

/// Horizontal band text is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: f32,
    pub width: f32,
}

/// Faces used for each text role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSet {
    pub title: BuiltinFont,
    pub heading: BuiltinFont,
    pub body: BuiltinFont,
    pub bold: BuiltinFont,
    pub italic: BuiltinFont,
    pub code: BuiltinFont,
}

impl From<FontStyle> for FontSet {
    fn from(style: FontStyle) -> Self {
        let title = style.title_family();
        let body = style.body_family();
        Self {
            title: title.bold(),
            heading: title.bold(),
            body: body.regular(),
            bold: body.bold(),
            italic: body.italic(),
            code: style.code_font(),
        }
    }
}

/// Geometry and wrapped header shared by every row of one table.
struct TableGrid {
    header: Vec<Vec<String>>,
    x: f32,
    cell_width: f32,
    table_width: f32,
}

#[derive(Debug, Clone, Copy)]
struct SectionContext {
    is_last: bool,
}

pub struct LayoutEngine {
    config: PdfLayout,
    fonts: FontSet,
    canvas: Canvas,
    cursor: Cursor,
    section: Option<SectionContext>,
    full_dividers: BTreeSet<usize>,
}

impl LayoutEngine {
    pub fn new(config: &PdfLayout, style: FontStyle) -> Self {
        Self {
            canvas: Canvas::new(config.page_width, config.page_height),
            cursor: Cursor {
                page: 0,
                y: config.margin,
            },
            config: config.clone(),
            fonts: FontSet::from(style),
            section: None,
            full_dividers: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &PdfLayout {
        &self.config
    }

    pub fn fonts(&self) -> FontSet {
        self.fonts
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Pages that received a full-height column divider on creation.
    pub fn full_dividers(&self) -> &BTreeSet<usize> {
        &self.full_dividers
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// Text area of the notes column.
    pub fn notes_column(&self) -> Column {
        let c = &self.config;
        Column {
            x: c.margin + c.key_column_width + c.column_padding,
            width: c.notes_width() - 2.0 * c.column_padding,
        }
    }

    /// Text area of the key-point column.
    pub fn key_column(&self) -> Column {
        let c = &self.config;
        Column {
            x: c.margin + c.column_padding,
            width: c.key_column_width - 2.0 * c.column_padding,
        }
    }

    /// The whole width between the margins.
    pub fn full_column(&self) -> Column {
        Column {
            x: self.config.margin,
            width: self.config.content_width(),
        }
    }

    /// x of the line separating the two columns.
    pub fn divider_x(&self) -> f32 {
        self.config.margin + self.config.key_column_width
    }

    /// Marks the section being laid out. Pages started while a section other
    /// than the last is active get a full-height column divider.
    pub fn begin_section(&mut self, is_last: bool) {
        self.section = Some(SectionContext { is_last });
    }

    pub fn end_section(&mut self) {
        self.section = None;
    }

    /// Starts a new page if `height` does not fit below the cursor.
    ///
    /// Returns `true` when the cursor moved to another page. A cursor already
    /// at the top of a page never moves, so oversized content cannot loop.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor.y + height > self.config.bottom() && self.cursor.y > self.config.margin {
            self.new_page();
            return true;
        }
        false
    }

    /// Moves the cursor to the top of the next page, creating it if needed.
    pub fn new_page(&mut self) {
        let next = self.cursor.page + 1;
        if next >= self.canvas.page_count() {
            self.canvas.add_page();
            debug!("started page {}", next + 1);
        }
        self.cursor = Cursor {
            page: next,
            y: self.config.margin,
        };

        if self.section.is_some_and(|s| !s.is_last) && self.full_dividers.insert(next) {
            let x = self.divider_x();
            self.line(next, x, self.config.margin, x, self.config.bottom(), Color::RULE);
        }
    }

    /// Advances the cursor, never past the printable bottom.
    pub fn advance(&mut self, height: f32) {
        self.cursor.y = (self.cursor.y + height).min(self.config.bottom());
    }

    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        page: usize,
        x: f32,
        baseline: f32,
        font: BuiltinFont,
        size: f32,
        color: Color,
        text: &str,
    ) {
        self.canvas.push(
            page,
            DrawOp::Text {
                x,
                y: baseline,
                font,
                size,
                color,
                text: text.to_string(),
            },
        );
    }

    pub fn line(&mut self, page: usize, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) {
        self.canvas.push(
            page,
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width: RULE_WIDTH,
                color,
            },
        );
    }

    /// Draws one already-wrapped line at the cursor and moves below it.
    fn draw_line(&mut self, x: f32, font: BuiltinFont, size: f32, color: Color, text: &str) {
        let height = self.config.line_height(size);
        self.ensure_space(height);
        let Cursor { page, y } = self.cursor;
        self.text(page, x, y + size, font, size, color, text);
        self.advance(height);
    }

    /// Wraps and draws text, one break check per wrapped line. Each source
    /// line starts a new output line.
    pub fn write_text(
        &mut self,
        text: &str,
        column: Column,
        font: BuiltinFont,
        size: f32,
        color: Color,
    ) -> Cursor {
        for source in text.lines() {
            for line in wrap_text(source, font, size, column.width) {
                self.draw_line(column.x, font, size, color, &line);
            }
        }
        self.cursor
    }

    /// Renders one block at the cursor inside `column`.
    pub fn render_block(&mut self, block: &Block, column: Column) -> Cursor {
        let body = self.config.body_size;
        match block {
            Block::Heading { level, text } => {
                let size = self.config.heading_size_for(*level);
                let font = self.fonts.heading;
                self.write_text(&strip_inline(text), column, font, size, Color::BLACK);
            }
            Block::Paragraph { text } => {
                let font = self.fonts.body;
                self.write_text(&strip_inline(text), column, font, body, Color::BLACK);
            }
            Block::UnorderedList { items } => {
                for item in items {
                    self.list_item(BULLET, item, column);
                }
            }
            Block::OrderedList { items } => {
                for (i, item) in items.iter().enumerate() {
                    self.list_item(&format!("{}.", i + 1), item, column);
                }
            }
            Block::Table(table) => self.table(table, column),
            Block::CodeBlock { lines, .. } => self.code_block(lines, column),
            Block::Blockquote { lines } => self.blockquote(lines, column),
            Block::Image { .. } => return self.cursor,
        }
        self.advance(self.config.block_spacing);
        self.cursor
    }

    fn list_item(&mut self, marker: &str, item: &str, column: Column) {
        let size = self.config.body_size;
        let font = self.fonts.body;
        let marker_x = column.x + self.config.list_indent;
        let text_x = marker_x + font.text_width(marker, size) + font.text_width(" ", size);
        let width = (column.x + column.width - text_x).max(size);

        let lines = wrap_text(&strip_inline(item), font, size, width);
        for (i, line) in lines.iter().enumerate() {
            let height = self.config.line_height(size);
            self.ensure_space(height);
            let Cursor { page, y } = self.cursor;
            if i == 0 {
                self.text(page, marker_x, y + size, font, size, Color::BLACK, marker);
            }
            self.text(page, text_x, y + size, font, size, Color::BLACK, line);
            self.advance(height);
        }
    }

    fn table(&mut self, table: &Table, column: Column) {
        let columns = table.column_count();
        if columns == 0 {
            return;
        }
        let size = self.config.small_size;
        let pad = self.config.cell_padding;
        let table_width = column.width - self.config.table_padding;
        let cell_width = table_width / columns as f32;
        let text_width = (cell_width - 2.0 * pad).max(size);

        let wrap_row = |cells: &[String], font: BuiltinFont| -> Vec<Vec<String>> {
            cells
                .iter()
                .map(|cell| wrap_text(&strip_inline(cell), font, size, text_width))
                .collect()
        };
        let grid = TableGrid {
            header: self.fit_header(wrap_row(&table.header, self.fonts.bold)),
            x: column.x,
            cell_width,
            table_width,
        };
        let header_height = self.row_height(&grid.header);
        let row_cap = self.config.printable_height() - header_height;

        let rows: Vec<Vec<Vec<String>>> = table
            .rows
            .iter()
            .map(|row| wrap_row(row, self.fonts.body))
            .collect();
        let first_row = rows.first().map_or(0.0, |r| self.row_height(r).min(row_cap));
        self.ensure_space(header_height + first_row);
        self.table_header(table, &grid);

        for (i, wrapped) in rows.iter().enumerate() {
            let height = self.row_height(wrapped);
            if height <= row_cap {
                if self.ensure_space(height) {
                    self.table_header(table, &grid);
                }
                self.table_row(table, wrapped, self.fonts.body, height, &grid);
            } else {
                self.split_row(table, wrapped, &grid);
            }

            if i + 1 < rows.len() {
                let Cursor { page, y } = self.cursor;
                self.line(page, grid.x, y, grid.x + grid.table_width, y, Color::RULE);
            }
        }
    }

    /// Draws a row taller than a page in slices, repeating the header on
    /// every page the row continues on.
    fn split_row(&mut self, table: &Table, cells: &[Vec<String>], grid: &TableGrid) {
        let pad = self.config.cell_padding;
        let line_height = self.config.line_height(self.config.small_size);
        let total = cells.iter().map(Vec::len).max().unwrap_or(0);
        debug!("splitting a {}-line table row across pages", total);

        let mut offset = 0;
        let mut fresh_page = false;
        while offset < total {
            let available = self.config.bottom() - self.cursor.y - 2.0 * pad;
            let mut fit = (available / line_height).floor().max(0.0) as usize;
            if fit == 0 {
                if !fresh_page {
                    self.new_page();
                    self.table_header(table, grid);
                    fresh_page = true;
                    continue;
                }
                fit = 1;
            }

            let count = fit.min(total - offset);
            let slice: Vec<Vec<String>> = cells
                .iter()
                .map(|lines| lines.iter().skip(offset).take(count).cloned().collect())
                .collect();
            let height = count as f32 * line_height + 2.0 * pad;
            self.table_row(table, &slice, self.fonts.body, height, grid);

            offset += count;
            if offset < total {
                self.new_page();
                self.table_header(table, grid);
                fresh_page = true;
            }
        }
    }

    /// Limits the header to half the printable height; it repeats on every
    /// page of the table.
    fn fit_header(&self, mut header: Vec<Vec<String>>) -> Vec<Vec<String>> {
        let line_height = self.config.line_height(self.config.small_size);
        let room = self.config.printable_height() / 2.0 - 2.0 * self.config.cell_padding;
        let max_lines = ((room / line_height).floor() as usize).max(1);
        if header.iter().any(|lines| lines.len() > max_lines) {
            warn!("table header cut to {} lines", max_lines);
            for lines in &mut header {
                lines.truncate(max_lines);
            }
        }
        header
    }

    fn row_height(&self, cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1) as f32;
        let natural = lines * self.config.line_height(self.config.small_size)
            + 2.0 * self.config.cell_padding;
        natural.max(self.config.row_height)
    }

    fn table_header(&mut self, table: &Table, grid: &TableGrid) {
        let height = self.row_height(&grid.header);
        self.table_row(table, &grid.header, self.fonts.bold, height, grid);
        let Cursor { page, y } = self.cursor;
        self.line(page, grid.x, y, grid.x + grid.table_width, y, Color::BLACK);
    }

    fn table_row(
        &mut self,
        table: &Table,
        cells: &[Vec<String>],
        font: BuiltinFont,
        height: f32,
        grid: &TableGrid,
    ) {
        let size = self.config.small_size;
        let pad = self.config.cell_padding;
        let line_height = self.config.line_height(size);
        let cell_width = grid.cell_width;
        let Cursor { page, y: top } = self.cursor;

        for (col, lines) in cells.iter().enumerate() {
            let cell_x = grid.x + col as f32 * cell_width;
            for (j, line) in lines.iter().enumerate() {
                let width = font.text_width(line, size);
                let line_x = match table.alignment(col) {
                    Alignment::Left => cell_x + pad,
                    Alignment::Center => cell_x + (cell_width - width) / 2.0,
                    Alignment::Right => cell_x + cell_width - pad - width,
                };
                let baseline = top + pad + j as f32 * line_height + size;
                self.text(page, line_x, baseline, font, size, Color::BLACK, line);
            }
        }
        self.advance(height);
    }

    fn code_block(&mut self, lines: &[String], column: Column) {
        let size = self.config.small_size;
        let pad = self.config.code_padding;
        let font = self.fonts.code;
        let line_height = self.config.line_height(size);
        let glyph = font.text_width("M", size);
        let per_line = (((column.width - 2.0 * pad) / glyph).floor() as usize).max(1);

        let visual: Vec<String> = lines
            .iter()
            .flat_map(|line| chunk_chars(line, per_line))
            .collect();
        let mut remaining: &[String] = &visual;

        while !remaining.is_empty() {
            let available = self.config.bottom() - self.cursor.y - 2.0 * pad;
            let mut fit = (available / line_height).floor().max(0.0) as usize;
            if fit == 0 {
                if self.cursor.y > self.config.margin {
                    self.new_page();
                    continue;
                }
                fit = 1;
            }
            let count = fit.min(remaining.len());
            let height = count as f32 * line_height + 2.0 * pad;
            let Cursor { page, y } = self.cursor;
            self.canvas.push(
                page,
                DrawOp::Rect {
                    x: column.x,
                    y,
                    width: column.width,
                    height,
                    color: Color::TINT,
                },
            );
            for (k, line) in remaining[..count].iter().enumerate() {
                let baseline = y + pad + k as f32 * line_height + size;
                self.text(page, column.x + pad, baseline, font, size, Color::BLACK, line);
            }
            self.advance(height);

            remaining = &remaining[count..];
            if !remaining.is_empty() {
                self.new_page();
            }
        }
    }

    fn blockquote(&mut self, lines: &[String], column: Column) {
        let size = self.config.body_size;
        let font = self.fonts.italic;
        let line_height = self.config.line_height(size);
        let rule_x = column.x + 2.0;
        let text_x = column.x + self.config.quote_indent;
        let width = column.width - self.config.quote_indent;

        let mut segment = self.cursor;
        for source in lines {
            for line in wrap_text(&strip_inline(source), font, size, width) {
                let before = self.cursor;
                if self.ensure_space(line_height) {
                    self.quote_rule(segment, before.y, rule_x);
                    segment = self.cursor;
                }
                let Cursor { page, y } = self.cursor;
                self.text(page, text_x, y + size, font, size, Color::MUTED, &line);
                self.advance(line_height);
            }
        }
        let end = self.cursor.y;
        self.quote_rule(segment, end, rule_x);
    }

    fn quote_rule(&mut self, start: Cursor, end_y: f32, x: f32) {
        if end_y > start.y {
            self.line(start.page, x, start.y, x, end_y, Color::MUTED);
        }
    }

    /// Places a decoded image scaled to the column width.
    ///
    /// The height follows the aspect ratio and is clamped to the maximum
    /// image height, in which case the width shrinks to match. Returns
    /// `None`, drawing nothing, when the payload cannot be decoded.
    pub fn place_image(&mut self, payload: &ImagePayload, column: Column) -> Option<Cursor> {
        let raster = match decode_image(payload) {
            Ok(raster) => raster,
            Err(e) => {
                warn!("skipping undecodable {} image: {}", payload.mime, e);
                return None;
            }
        };
        if raster.width == 0 || raster.height == 0 {
            warn!("skipping empty image");
            return None;
        }

        let ratio = raster.height as f32 / raster.width as f32;
        let mut width = column.width;
        let mut height = width * ratio;
        if height > self.config.max_image_height {
            height = self.config.max_image_height;
            width = height / ratio;
        }

        self.ensure_space(height);
        let index = self.canvas.add_image(raster);
        let Cursor { page, y } = self.cursor;
        self.canvas.push(
            page,
            DrawOp::Image {
                x: column.x,
                y,
                width,
                height,
                index,
            },
        );
        self.advance(height + self.config.image_spacing);
        Some(self.cursor)
    }
}

/// Splits a line into pieces of at most `width` characters; an empty line
/// stays one empty line.
fn chunk_chars(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

/// Decodes an image and flattens any transparency onto white.
fn decode_image(payload: &ImagePayload) -> Result<RasterImage, image::ImageError> {
    let decoded = image::load_from_memory(&payload.bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in decoded.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    Ok(RasterImage { width, height, rgb })
}
