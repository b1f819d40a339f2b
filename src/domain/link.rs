//! Cross-note link tokens.
//!
//! Notes refer to each other with `[[Title]]` tokens, optionally carrying a
//! display label as `[[Title|label]]`. Links are pulled from raw text and do
//! not depend on block structure.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static LINK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|[^\[\]]*)?\]\]").unwrap());

/// Returns the distinct titles referenced by `[[...]]` tokens.
///
/// Titles are trimmed; duplicates are removed keeping the first occurrence,
/// so the result follows source order. Empty titles are ignored.
///
/// # Examples
///
/// ```
/// use cornell::domain::extract_links;
///
/// let links = extract_links("See [[Other Note]] and [[Other Note|again]], then [[Third]].");
/// assert_eq!(links, vec!["Other Note", "Third"]);
/// ```
pub fn extract_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    LINK_TOKEN
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
        .filter(|title| seen.insert(title.clone()))
        .collect()
}
