//! Command handlers for the CLI.

mod completions;
mod export;
mod image;
mod links;
mod sections;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::output::{Output, OutputFormat};

pub use completions::handle_completions;
pub use export::handle_export;
pub use image::handle_image_add;
pub use links::handle_links;
pub use sections::handle_sections;

// ===========================================
// Shared Utilities
// ===========================================

/// Finds the note file a command refers to.
///
/// The argument is tried as given, then inside the notes directory, each
/// time also with a `.md` extension appended.
pub(crate) fn resolve_note_path(note: &Path, notes_dir: &Path) -> Result<PathBuf> {
    let mut candidates = vec![note.to_path_buf()];
    if note.is_relative() {
        candidates.push(notes_dir.join(note));
    }
    if note.extension().is_none() {
        let with_ext: Vec<PathBuf> = candidates
            .iter()
            .map(|p| p.with_extension("md"))
            .collect();
        candidates.extend(with_ext);
    }

    match candidates.into_iter().find(|p| p.is_file()) {
        Some(path) => Ok(path),
        None => bail!("note not found: {}", note.display()),
    }
}

/// Prints a result in the requested format.
///
/// `paths` is what the `paths` format prints, one entry per line.
pub(crate) fn print_output<T: serde::Serialize>(
    format: OutputFormat,
    data: T,
    human: &str,
    paths: &[String],
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if !human.is_empty() {
                println!("{}", human);
            }
        }
        OutputFormat::Json => println!("{}", Output::new(data).to_json()?),
        OutputFormat::Paths => {
            for path in paths {
                println!("{}", path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolves_name_inside_notes_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bio.md"), "# A\nb").unwrap();

        let found = resolve_note_path(Path::new("bio"), dir.path()).unwrap();
        assert_eq!(found, dir.path().join("bio.md"));
        let found = resolve_note_path(Path::new("bio.md"), dir.path()).unwrap();
        assert_eq!(found, dir.path().join("bio.md"));
    }

    #[test]
    fn absolute_path_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.md");
        std::fs::write(&path, "").unwrap();
        assert_eq!(resolve_note_path(&path, Path::new("/elsewhere")).unwrap(), path);
    }

    #[test]
    fn missing_note_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_note_path(Path::new("nope"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("note not found"));
    }
}
