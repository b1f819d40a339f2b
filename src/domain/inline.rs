//! Inline emphasis handling for plain-text output.

use std::sync::LazyLock;

use regex::Regex;

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());
static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap());
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Removes inline markdown markers, keeping only the visible text.
///
/// Handles `**bold**`, `*italic*`, `` `code` ``, `[text](url)` and
/// `[[Note]]` / `[[Note|label]]`.
///
/// ```
/// use cornell::domain::strip_inline;
///
/// assert_eq!(strip_inline("**Bold** and *soft* `code`"), "Bold and soft code");
/// assert_eq!(strip_inline("see [[Other Note]]"), "see Other Note");
/// ```
pub fn strip_inline(text: &str) -> String {
    let text = WIKI_LINK.replace_all(text, |caps: &regex::Captures| {
        caps.get(2)
            .map_or(caps[1].trim(), |label| label.as_str().trim())
            .to_string()
    });
    let text = MARKDOWN_LINK.replace_all(&text, "$1");
    let text = CODE_SPAN.replace_all(&text, "$1");
    let text = BOLD.replace_all(&text, "$1");
    ITALIC.replace_all(&text, "$1").into_owned()
}
