//! File I/O: reading notes and delivering export files with atomic writes.

use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::domain::Document;
use crate::infra::frontmatter::{ParseError, parse};

/// Errors during file system operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("note file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse note at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },
}

impl FsError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Reads a note file into a [`Document`].
///
/// The file stem is used as the title when the frontmatter has none.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the file doesn't exist.
/// Returns `FsError::InvalidEncoding` if the file is not UTF-8.
/// Returns `FsError::Parse` if the frontmatter is invalid.
pub fn read_document(path: &Path) -> Result<Document, FsError> {
    let bytes = std::fs::read(path).map_err(|e| FsError::from_io(path, e))?;

    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(FsError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 byte order mark detected; convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    parse(content, stem).map_err(|e| FsError::Parse {
        path: path.into(),
        source: e,
    })
}

/// Writes an export file into `dir` atomically and returns its path.
///
/// The directory is created if needed. A temporary file is written first
/// and renamed into place, so a failed export never leaves a partial file.
///
/// # Errors
///
/// Returns `FsError::NotADirectory` if `dir` exists but is a file.
/// Returns `FsError::AtomicWrite` if the final rename fails.
pub fn write_output(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, FsError> {
    if dir.exists() && !dir.is_dir() {
        return Err(FsError::NotADirectory { path: dir.into() });
    }
    std::fs::create_dir_all(dir).map_err(|e| FsError::from_io(dir, e))?;

    let path = dir.join(filename);
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| FsError::Io {
        path: path.clone(),
        source: e,
    })?;
    temp.write_all(bytes).map_err(|e| FsError::Io {
        path: path.clone(),
        source: e,
    })?;
    temp.persist(&path).map_err(|e| FsError::AtomicWrite {
        path: path.clone(),
        source: e.error,
    })?;

    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Scans a directory recursively for markdown (.md) files.
///
/// Skips hidden files and directories (starting with `.`), including the
/// default `.images/` store. Returned paths are joined onto `dir` and sorted.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the directory doesn't exist.
/// Returns `FsError::NotADirectory` if the path is not a directory.
pub fn scan_notes_directory(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    if !dir.exists() {
        return Err(FsError::NotFound { path: dir.into() });
    }
    if !dir.is_dir() {
        return Err(FsError::NotADirectory { path: dir.into() });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(has_md_extension)
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn has_md_extension(entry: &DirEntry) -> bool {
    entry.path().extension().is_some_and(|e| e == "md")
}
