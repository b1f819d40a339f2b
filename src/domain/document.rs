//! Document and section types.

use serde::Serialize;

/// A note as handed to the exporters.
///
/// The body uses the informal markdown dialect understood by
/// [`parse_blocks`](crate::domain::parse_blocks). Exporters only ever read it.
///
/// # Examples
///
/// ```
/// use cornell::domain::Document;
///
/// let doc = Document::new("Biology", "", "# Cells\nThe unit of life.");
/// assert_eq!(doc.sections().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub title: String,
    pub summary: String,
    pub body: String,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            body: body.into(),
        }
    }

    /// Splits the body into sections along top-level headings.
    pub fn sections(&self) -> Vec<Section> {
        split_sections(&self.body)
    }

    /// Sections that carry content; blank sections are never exported.
    pub fn renderable_sections(&self) -> Vec<Section> {
        self.sections()
            .into_iter()
            .filter(|s| !s.is_blank())
            .collect()
    }

    /// Returns true if the summary holds anything besides whitespace.
    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

/// A top-level-heading-delimited part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

impl Section {
    /// Returns true if the section body is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Splits raw note text into sections.
///
/// A section starts at every line beginning with a single `#` followed by a
/// space and runs until the next such line. Text before the first heading
/// belongs to no section, so a body without top-level headings yields nothing.
/// Lines inside fenced code blocks are never treated as headings.
pub fn split_sections(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut in_fence = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        let heading = if in_fence { None } else { top_level_heading(line) };

        match heading {
            Some(text) => {
                if let Some((heading, lines)) = current.take() {
                    sections.push(Section {
                        heading,
                        content: lines.join("\n"),
                    });
                }
                current = Some((text.to_string(), Vec::new()));
            }
            None => {
                if let Some((_, lines)) = current.as_mut() {
                    lines.push(line);
                }
            }
        }
    }

    if let Some((heading, lines)) = current {
        sections.push(Section {
            heading,
            content: lines.join("\n"),
        });
    }

    sections
}

fn top_level_heading(line: &str) -> Option<&str> {
    line.strip_prefix("# ").map(str::trim)
}
