//! Content-addressed image storage.
//!
//! Images are stored under the SHA-256 of their bytes, so the same picture
//! pasted twice is kept once. Notes refer to stored images as
//! `store:<id>`, where the id is either the full 64-character hex digest or
//! an unambiguous prefix of at least [`MIN_PREFIX_LEN`] characters.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::ImagePayload;

/// Shortest id prefix accepted for lookups.
pub const MIN_PREFIX_LEN: usize = 8;

/// Looks up image payloads for the exporters.
///
/// Implementations must not fail for a missing id; they return `None` and
/// the exporters degrade gracefully.
pub trait ImageResolver {
    /// Resolves a store id to its payload.
    fn resolve(&self, id: &str) -> Option<ImagePayload>;

    /// Fetches an external `http(s)` image. Plain stores cannot download;
    /// see [`FetchingResolver`](crate::infra::FetchingResolver).
    fn fetch(&self, url: &str) -> Option<ImagePayload> {
        debug!("no fetcher configured, skipping {}", url);
        None
    }
}

/// A resolver that knows no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve(&self, _id: &str) -> Option<ImagePayload> {
        None
    }
}

/// SHA-256 of an image's bytes as 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId {
    hex: String,
}

impl ImageId {
    /// Computes the id of the given bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            hex: format!("{:x}", hasher.finalize()),
        }
    }

    /// Parses a full hex id, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::InvalidId` unless the input is exactly 64
    /// hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ImageStoreError> {
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ImageStoreError::InvalidId(hex.to_string()));
        }
        Ok(Self {
            hex: hex.to_ascii_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// The reference to put in a note's image `src`.
    pub fn reference(&self) -> String {
        format!("{}{}", crate::domain::STORE_PREFIX, self.hex)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex)
    }
}

/// Errors from the image store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("invalid image id '{0}': expected hex characters")]
    InvalidId(String),

    #[error("image id prefix '{prefix}' is ambiguous ({count} matches)")]
    Ambiguous { prefix: String, count: usize },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Image store backed by a directory of `<id>.<ext>` files.
#[derive(Debug, Clone)]
pub struct DirImageStore {
    root: PathBuf,
}

impl DirImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores image bytes and returns their id.
    ///
    /// Adding the same bytes twice is a no-op that returns the same id.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Io` if the directory cannot be created or
    /// the file cannot be written.
    pub fn add(&self, bytes: &[u8]) -> Result<ImageId, ImageStoreError> {
        let id = ImageId::compute(bytes);
        if self.find(id.as_str())?.is_some() {
            debug!("image {} already stored", id);
            return Ok(id);
        }

        std::fs::create_dir_all(&self.root).map_err(|e| self.io_error(&self.root, e))?;

        let payload = ImagePayload::from_bytes(bytes.to_vec());
        let path = self
            .root
            .join(format!("{}.{}", id.as_str(), payload.extension()));

        let mut temp = NamedTempFile::new_in(&self.root).map_err(|e| self.io_error(&path, e))?;
        temp.write_all(bytes).map_err(|e| self.io_error(&path, e))?;
        temp.persist(&path)
            .map_err(|e| self.io_error(&path, e.error))?;

        debug!("stored image {} at {}", id, path.display());
        Ok(id)
    }

    /// Finds the file for an id or unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::InvalidId` for non-hex or too short ids,
    /// `ImageStoreError::Ambiguous` when a prefix matches several images.
    pub fn find(&self, id: &str) -> Result<Option<PathBuf>, ImageStoreError> {
        let id = id.trim().to_ascii_lowercase();
        if id.len() < MIN_PREFIX_LEN || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ImageStoreError::InvalidId(id));
        }

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.root, e)),
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| stem.starts_with(&id))
            })
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(ImageStoreError::Ambiguous { prefix: id, count }),
        }
    }

    fn io_error(&self, path: &Path, source: io::Error) -> ImageStoreError {
        ImageStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ImageResolver for DirImageStore {
    fn resolve(&self, id: &str) -> Option<ImagePayload> {
        let path = match self.find(id) {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!("image {} not in store {}", id, self.root.display());
                return None;
            }
            Err(e) => {
                warn!("cannot resolve image {}: {}", id, e);
                return None;
            }
        };

        match std::fs::read(&path) {
            Ok(bytes) => Some(ImagePayload::from_bytes(bytes)),
            Err(e) => {
                warn!("cannot read image {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// In-memory image store, keyed by the ids it was given.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: HashMap<String, ImagePayload>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a payload under its content id.
    pub fn add(&mut self, payload: ImagePayload) -> ImageId {
        let id = ImageId::compute(&payload.bytes);
        self.images.insert(id.as_str().to_string(), payload);
        id
    }

    /// Adds a payload under an arbitrary id.
    pub fn insert(&mut self, id: impl Into<String>, payload: ImagePayload) {
        self.images.insert(id.into(), payload);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageResolver for MemoryImageStore {
    fn resolve(&self, id: &str) -> Option<ImagePayload> {
        self.images.get(id.trim()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    // ===========================================
    // ImageId
    // ===========================================

    #[test]
    fn image_id_of_known_content() {
        let id = ImageId::compute(b"hello world");
        assert_eq!(
            id.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn image_id_from_hex_normalizes_case() {
        let upper = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
        let id = ImageId::from_hex(upper).unwrap();
        assert_eq!(id, ImageId::compute(&[]));
    }

    #[test]
    fn image_id_rejects_bad_hex() {
        assert!(ImageId::from_hex("abcd").is_err());
        let invalid = "g3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert!(matches!(
            ImageId::from_hex(invalid),
            Err(ImageStoreError::InvalidId(_))
        ));
    }

    #[test]
    fn reference_uses_store_prefix() {
        let id = ImageId::compute(b"x");
        assert_eq!(id.reference(), format!("store:{}", id));
    }

    // ===========================================
    // DirImageStore
    // ===========================================

    #[test]
    fn add_then_resolve_by_full_id_and_prefix() {
        let dir = TempDir::new().unwrap();
        let store = DirImageStore::new(dir.path().join("images"));
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(b"rest of png");

        let id = store.add(&bytes).unwrap();
        let file = store.find(id.as_str()).unwrap().unwrap();
        assert_eq!(file.extension().unwrap(), "png");

        let payload = store.resolve(id.as_str()).unwrap();
        assert_eq!(payload.mime, "image/png");
        assert_eq!(payload.bytes, bytes);

        assert!(store.resolve(&id.as_str()[..12]).is_some());
    }

    #[test]
    fn adding_twice_keeps_one_file() {
        let dir = TempDir::new().unwrap();
        let store = DirImageStore::new(dir.path());
        let first = store.add(b"same bytes").unwrap();
        let second = store.add(b"same bytes").unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_and_invalid_ids_resolve_to_none() {
        let dir = TempDir::new().unwrap();
        let store = DirImageStore::new(dir.path());
        assert!(store.resolve("0123456789abcdef").is_none());
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("abc").is_none());
    }

    #[test]
    fn missing_directory_is_empty_store() {
        let store = DirImageStore::new("/nonexistent/cornell/images");
        assert!(store.find("0123456789abcdef").unwrap().is_none());
    }

    #[test]
    fn memory_store_resolves_inserted_ids() {
        let mut store = MemoryImageStore::new();
        store.insert(
            "logo",
            ImagePayload {
                mime: "image/png".into(),
                bytes: vec![1, 2, 3],
            },
        );
        assert_eq!(store.len(), 1);
        assert!(store.resolve("logo").is_some());
        assert!(store.resolve("other").is_none());
        assert!(NoImages.resolve("logo").is_none());
    }
}
