//! File I/O, frontmatter parsing, image storage and fetching, output filenames

mod fetch;
mod frontmatter;
mod fs;
mod image_store;
mod slug;

pub use fetch::{
    DEFAULT_FETCH_TIMEOUT, FetchError, FetchingResolver, HttpFetcher, ImageFetcher,
};
pub use frontmatter::{ParseError, parse};
pub use fs::{FsError, read_document, scan_notes_directory, write_output};
pub use image_store::{
    DirImageStore, ImageId, ImageResolver, ImageStoreError, MIN_PREFIX_LEN, MemoryImageStore,
    NoImages,
};
pub use slug::{flashcards_filename, pdf_filename, slugify};
