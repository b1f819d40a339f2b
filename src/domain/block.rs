//! Block-level parser for section bodies.
//!
//! The parser makes a single forward pass over the lines of a section and
//! never backtracks. Each line is tested against the block rules in priority
//! order: blank line, table run, code fence, blockquote, unordered list,
//! ordered list, sub-heading, image, and finally paragraph text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s+(.*)$").unwrap());

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").unwrap());

static SUB_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,6})\s+(.*)$").unwrap());

static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

static HTML_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']*)["']"#).unwrap());

static HTML_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\balt\s*=\s*["']([^"']*)["']"#).unwrap());

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Derives the alignment from a separator-row cell.
    ///
    /// `:---:` is centered, `---:` is right aligned and everything else,
    /// including `:---`, is left aligned.
    ///
    /// ```
    /// use cornell::domain::Alignment;
    ///
    /// assert_eq!(Alignment::from_separator(":---:"), Alignment::Center);
    /// assert_eq!(Alignment::from_separator("---:"), Alignment::Right);
    /// assert_eq!(Alignment::from_separator(":---"), Alignment::Left);
    /// ```
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        let starts = cell.starts_with(':');
        let ends = cell.len() > 1 && cell.ends_with(':');
        match (starts, ends) {
            (true, true) => Alignment::Center,
            (false, true) => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// CSS `text-align` value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// A pipe table. Every row holds exactly `header.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub alignments: Vec<Alignment>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Alignment of a column, left if the separator row was short.
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }
}

/// One structural unit of section content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    UnorderedList { items: Vec<String> },
    OrderedList { items: Vec<String> },
    Table(Table),
    CodeBlock { language: Option<String>, lines: Vec<String> },
    Blockquote { lines: Vec<String> },
    Image { source: String, alt: String },
}

impl Block {
    /// Short name of the block kind, used in listings and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::UnorderedList { .. } => "unordered_list",
            Block::OrderedList { .. } => "ordered_list",
            Block::Table(_) => "table",
            Block::CodeBlock { .. } => "code_block",
            Block::Blockquote { .. } => "blockquote",
            Block::Image { .. } => "image",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image { .. })
    }
}

/// Parses a section body into blocks.
///
/// # Examples
///
/// ```
/// use cornell::domain::{parse_blocks, Block};
///
/// let blocks = parse_blocks("Hello\n\n- one\n- two");
/// assert_eq!(blocks.len(), 2);
/// assert!(matches!(&blocks[1], Block::UnorderedList { items } if items.len() == 2));
/// ```
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut parser = BlockParser {
        lines: &lines,
        pos: 0,
        blocks: Vec::new(),
        paragraph: Vec::new(),
    };
    parser.run();
    parser.blocks
}

struct BlockParser<'a> {
    lines: &'a [&'a str],
    pos: usize,
    blocks: Vec<Block>,
    paragraph: Vec<&'a str>,
}

impl<'a> BlockParser<'a> {
    fn run(&mut self) {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];

            if line.trim().is_empty() {
                self.flush_paragraph();
                self.pos += 1;
                continue;
            }

            if let Some(block) = self.try_block() {
                self.flush_paragraph();
                self.blocks.extend(block);
                continue;
            }

            self.paragraph.push(line);
            self.pos += 1;
        }
        self.flush_paragraph();
    }

    /// Tries every block rule at the current line. On success the consumed
    /// lines are skipped and the produced blocks returned.
    fn try_block(&mut self) -> Option<Vec<Block>> {
        let line = self.lines[self.pos];

        if let Some(table) = self.table() {
            return Some(vec![Block::Table(table)]);
        }
        if is_fence(line) {
            return Some(vec![self.code_block()]);
        }
        if line.trim_start().starts_with('>') {
            let lines = self.take_run(|l| l.trim_start().starts_with('>'), strip_quote_marker);
            return Some(vec![Block::Blockquote { lines }]);
        }
        if UNORDERED_ITEM.is_match(line) {
            let items = self.take_run(|l| UNORDERED_ITEM.is_match(l), unordered_item_text);
            return Some(vec![Block::UnorderedList { items }]);
        }
        if ORDERED_ITEM.is_match(line) {
            let items = self.take_run(|l| ORDERED_ITEM.is_match(l), ordered_item_text);
            return Some(vec![Block::OrderedList { items }]);
        }
        if let Some(caps) = SUB_HEADING.captures(line) {
            self.pos += 1;
            return Some(vec![Block::Heading {
                level: caps[1].len() as u8,
                text: caps[2].trim().to_string(),
            }]);
        }
        if let Some(blocks) = image_line(line) {
            self.pos += 1;
            return Some(blocks);
        }
        None
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join("\n");
        self.paragraph.clear();
        self.blocks.push(Block::Paragraph { text });
    }

    /// A table needs at least two consecutive pipe-bounded lines: the header
    /// and the separator row.
    fn table(&mut self) -> Option<Table> {
        let run = self.lines[self.pos..]
            .iter()
            .take_while(|l| is_table_row(l))
            .count();
        if run < 2 {
            return None;
        }

        let rows = &self.lines[self.pos..self.pos + run];
        self.pos += run;

        let header = split_row(rows[0]);
        let width = header.len();
        let mut alignments: Vec<Alignment> = split_row(rows[1])
            .iter()
            .map(|c| Alignment::from_separator(c))
            .collect();
        alignments.resize(width, Alignment::Left);

        let rows = rows[2..]
            .iter()
            .map(|row| {
                let mut cells = split_row(row);
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Some(Table {
            header,
            alignments,
            rows,
        })
    }

    fn code_block(&mut self) -> Block {
        let opening = self.lines[self.pos].trim_start();
        let language = opening.trim_start_matches('`').trim();
        let language = (!language.is_empty()).then(|| language.to_string());
        self.pos += 1;

        let mut lines = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            if is_fence(line) {
                break;
            }
            lines.push(line.to_string());
        }

        Block::CodeBlock { language, lines }
    }

    fn take_run(
        &mut self,
        matches: impl Fn(&str) -> bool,
        item: fn(&str) -> String,
    ) -> Vec<String> {
        let mut items = Vec::new();
        while self.pos < self.lines.len() && matches(self.lines[self.pos]) {
            items.push(item(self.lines[self.pos]));
            self.pos += 1;
        }
        items
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

/// Splits `| a | b |` into trimmed cells.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('|')
        .and_then(|s| s.strip_suffix('|'))
        .unwrap_or(trimmed);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn strip_quote_marker(line: &str) -> String {
    let rest = line.trim_start().strip_prefix('>').unwrap_or(line);
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

fn unordered_item_text(line: &str) -> String {
    let trimmed = line.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => trimmed[idx..].trim().to_string(),
        None => String::new(),
    }
}

fn ordered_item_text(line: &str) -> String {
    match line.find('.') {
        Some(idx) => line[idx + 1..].trim().to_string(),
        None => line.trim().to_string(),
    }
}

/// Extracts every image on a line. Text left around the images becomes a
/// trailing paragraph.
fn image_line(line: &str) -> Option<Vec<Block>> {
    let mut found: Vec<(usize, usize, Block)> = Vec::new();

    for m in HTML_IMAGE.find_iter(line) {
        let tag = m.as_str();
        let source = HTML_SRC
            .captures(tag)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let alt = HTML_ALT
            .captures(tag)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        found.push((m.start(), m.end(), Block::Image { source, alt }));
    }
    for caps in MARKDOWN_IMAGE.captures_iter(line) {
        let m = caps.get(0)?;
        found.push((
            m.start(),
            m.end(),
            Block::Image {
                source: caps[2].to_string(),
                alt: caps[1].to_string(),
            },
        ));
    }

    if found.is_empty() {
        return None;
    }
    found.sort_by_key(|(start, _, _)| *start);

    let mut rest = String::new();
    let mut last = 0;
    for (start, end, _) in &found {
        if *start >= last {
            rest.push_str(&line[last..*start]);
            last = *end;
        }
    }
    rest.push_str(&line[last..]);

    let mut blocks: Vec<Block> = found.into_iter().map(|(_, _, b)| b).collect();
    let rest = rest.trim();
    if !rest.is_empty() {
        blocks.push(Block::Paragraph {
            text: rest.to_string(),
        });
    }
    Some(blocks)
}
