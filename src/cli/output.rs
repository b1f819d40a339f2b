//! Output format types for CLI commands.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain file paths, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    /// Pretty-printed JSON of the wrapped data.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One exported file.
#[derive(Debug, Serialize)]
pub struct ExportListing {
    pub title: String,
    pub source: String,
    pub path: String,
    pub format: String,
    /// Pages for PDFs, cards for flashcard packages.
    pub units: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<usize>,
}

/// A note that could not be exported during `export --all`.
#[derive(Debug, Serialize)]
pub struct ExportFailure {
    pub source: String,
    pub error: String,
}

/// A section with its block breakdown.
#[derive(Debug, Serialize)]
pub struct SectionListing {
    pub index: usize,
    pub heading: String,
    pub blank: bool,
    pub blocks: Vec<&'static str>,
}

/// A stored image.
#[derive(Debug, Serialize)]
pub struct ImageListing {
    pub id: String,
    pub path: String,
    pub markdown: String,
}
