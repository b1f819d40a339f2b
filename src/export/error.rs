//! Errors reported by the exporters.

use thiserror::Error;

/// Failure of a whole export. No partial output accompanies it.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The note has no non-empty `# ` section to export.
    #[error("no sections to export: add at least one '# Heading' with content")]
    NoSections,

    /// Any other failure while producing the output.
    #[error("failed to generate {format}: {message}")]
    Generation {
        format: &'static str,
        message: String,
    },

    /// The configured page geometry cannot hold any content.
    #[error("invalid PDF layout: {0}")]
    InvalidLayout(String),
}

/// Internal failure while rendering; surfaced as [`ExportError::Generation`].
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("{0}")]
    Layout(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl RenderError {
    pub(crate) fn into_export(self, format: &'static str) -> ExportError {
        ExportError::Generation {
            format,
            message: self.to_string(),
        }
    }
}
