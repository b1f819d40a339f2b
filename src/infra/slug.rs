//! Output filename generation.

use chrono::{DateTime, Utc};

/// Converts a title to a filename-safe slug.
///
/// - Converts to lowercase
/// - Replaces every run of non-alphanumeric characters with one hyphen
/// - Trims leading/trailing hyphens
/// - Returns "untitled" for empty results
///
/// # Examples
///
/// ```
/// use cornell::infra::slugify;
///
/// assert_eq!(slugify("Cell Biology: Part 2"), "cell-biology-part-2");
/// assert_eq!(slugify("!!!"), "untitled");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        return "untitled".to_string();
    }
    slug
}

/// Filename for the PDF export of a note.
///
/// ```
/// use cornell::infra::pdf_filename;
///
/// assert_eq!(pdf_filename("My Notes"), "my-notes.pdf");
/// ```
pub fn pdf_filename(title: &str) -> String {
    format!("{}.pdf", slugify(title))
}

/// Filename for the flashcard package of a note, stamped with the export time.
pub fn flashcards_filename(title: &str, now: DateTime<Utc>) -> String {
    format!("{}-anki-{}.zip", slugify(title), now.format("%Y%m%d-%H%M%S"))
}
