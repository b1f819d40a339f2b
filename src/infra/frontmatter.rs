//! Frontmatter parser for reading notes from markdown files.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::Document;

/// Metadata accepted in a note's YAML frontmatter. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct NoteMeta {
    title: Option<String>,
    #[serde(alias = "description")]
    summary: Option<String>,
}

/// Errors during frontmatter parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing closing frontmatter delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parses a note file into a [`Document`].
///
/// Frontmatter is optional:
/// ```text
/// ---
/// title: Note Title
/// summary: One paragraph overview
/// ---
/// # First section
/// ...
/// ```
/// Without frontmatter (or without a `title` key) the title is
/// `fallback_title`, usually the file stem.
///
/// # Errors
///
/// Returns `ParseError` if the frontmatter is opened but never closed, or
/// if the YAML between the delimiters is invalid.
pub fn parse(content: &str, fallback_title: &str) -> Result<Document, ParseError> {
    let after_opening = if content.starts_with("---\r\n") {
        5
    } else if content.starts_with("---\n") {
        4
    } else {
        return Ok(Document::new(fallback_title, "", content));
    };

    let yaml_and_rest = &content[after_opening..];
    let closing_pos = find_closing_delimiter(yaml_and_rest)?;
    let yaml = &yaml_and_rest[..closing_pos];

    let after_closing = &yaml_and_rest[closing_pos..];
    let body = after_closing
        .strip_prefix("---\r\n")
        .or_else(|| after_closing.strip_prefix("---\n"))
        .unwrap_or(&after_closing[3..]);

    let meta: NoteMeta = if yaml.trim().is_empty() {
        NoteMeta::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let title = meta
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    Ok(Document::new(
        title.trim(),
        meta.summary.unwrap_or_default().trim(),
        body,
    ))
}

/// Finds the byte offset of the closing `---` line.
fn find_closing_delimiter(content: &str) -> Result<usize, ParseError> {
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Ok(pos);
        }
        pos += line.len();
    }
    Err(ParseError::MissingClosingDelimiter)
}
