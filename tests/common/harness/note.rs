//! Builder for test notes with sensible defaults.

/// Builder for markdown notes used in CLI tests.
///
/// Produces a file with optional frontmatter followed by `# Heading`
/// sections, in the order they were added.
#[derive(Debug)]
pub struct TestNote {
    title: String,
    summary: Option<String>,
    sections: Vec<(String, String)>,
    raw_body: Option<String>,
}

impl TestNote {
    /// Creates a new test note with the given title and no sections.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            sections: Vec::new(),
            raw_body: None,
        }
    }

    /// Sets the summary written to the frontmatter.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Appends a `# heading` section with the given content.
    pub fn section(mut self, heading: impl Into<String>, content: impl Into<String>) -> Self {
        self.sections.push((heading.into(), content.into()));
        self
    }

    /// Replaces the generated sections with a literal body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Renders the full file content.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("---\ntitle: \"{}\"\n", self.title);
        if let Some(summary) = &self.summary {
            out.push_str(&format!("summary: \"{}\"\n", summary));
        }
        out.push_str("---\n");

        match &self.raw_body {
            Some(body) => out.push_str(body),
            None => {
                for (heading, content) in &self.sections {
                    out.push_str(&format!("# {}\n{}\n\n", heading, content));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_renders_frontmatter() {
        let md = TestNote::new("Cells").summary("Basics").to_markdown();
        assert!(md.starts_with("---\ntitle: \"Cells\"\nsummary: \"Basics\"\n---\n"));
    }

    #[test]
    fn test_note_renders_sections_in_order() {
        let md = TestNote::new("T")
            .section("One", "first")
            .section("Two", "second")
            .to_markdown();
        let one = md.find("# One").unwrap();
        let two = md.find("# Two").unwrap();
        assert!(one < two);
    }
}
