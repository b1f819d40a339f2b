//! Section content to inline-styled HTML for flashcard backs.
//!
//! Flashcard apps strip stylesheets, so every element carries its own
//! `style` attribute. Text is escaped before any markup is introduced.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use log::{debug, warn};
use regex::Regex;
use uuid::Uuid;

use crate::domain::{Block, ImagePayload, ImageSource, Table, parse_blocks};
use crate::infra::ImageResolver;

const P_STYLE: &str = "margin: 0 0 8px 0; line-height: 1.5;";
const H2_STYLE: &str = "font-size: 1.3em; margin: 12px 0 6px 0;";
const H3_STYLE: &str = "font-size: 1.15em; margin: 10px 0 6px 0;";
const H4_STYLE: &str = "font-size: 1.05em; margin: 8px 0 4px 0;";
const LIST_STYLE: &str = "margin: 0 0 8px 0; padding-left: 24px;";
const LI_STYLE: &str = "margin: 2px 0;";
const TABLE_STYLE: &str = "border-collapse: collapse; margin: 8px 0; width: 100%;";
const TH_STYLE: &str = "border: 1px solid #ccc; padding: 4px 8px; background: #f0f0f0;";
const TD_STYLE: &str = "border: 1px solid #ccc; padding: 4px 8px;";
const PRE_STYLE: &str = "background: #f5f5f5; padding: 8px; border-radius: 4px; overflow-x: auto; font-family: monospace; font-size: 0.9em;";
const CODE_STYLE: &str = "background: #f0f0f0; padding: 1px 4px; border-radius: 3px; font-family: monospace;";
const QUOTE_STYLE: &str = "border-left: 3px solid #ccc; margin: 8px 0; padding-left: 10px; color: #555;";
const IMG_STYLE: &str = "max-width: 100%; height: auto;";
const LINK_STYLE: &str = "color: #0066cc;";

pub(crate) const IMAGE_NOT_FOUND: &str = "<em>[Image not found]</em>";
pub(crate) const PLACEHOLDER_IMAGE: &str = "<em>[Placeholder image]</em>";

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").unwrap());

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new("\u{0}(\\d+)\u{0}").unwrap());

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// HTML for one card side plus the images it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardHtml {
    pub html: String,
    /// Media filename to payload; the HTML refers to these names.
    pub images: BTreeMap<String, ImagePayload>,
}

/// Converts section content into card HTML.
pub fn content_to_html(content: &str, resolver: &dyn ImageResolver) -> CardHtml {
    let mut converter = Converter {
        resolver,
        images: BTreeMap::new(),
    };
    let html: String = parse_blocks(content)
        .iter()
        .map(|block| converter.block(block))
        .collect();
    CardHtml {
        html: normalize(&html),
        images: converter.images,
    }
}

struct Converter<'a> {
    resolver: &'a dyn ImageResolver,
    images: BTreeMap<String, ImagePayload>,
}

impl Converter<'_> {
    fn block(&mut self, block: &Block) -> String {
        match block {
            Block::Heading { level, text } => {
                let (tag, style) = match level {
                    0..=2 => ("h2", H2_STYLE),
                    3 => ("h3", H3_STYLE),
                    _ => ("h4", H4_STYLE),
                };
                format!("<{tag} style=\"{style}\">{}</{tag}>", inline(text))
            }
            Block::Paragraph { text } => {
                let lines: Vec<String> = text.lines().map(inline).collect();
                format!("<p style=\"{P_STYLE}\">{}</p>", lines.join("<br>"))
            }
            Block::UnorderedList { items } => list("ul", items),
            Block::OrderedList { items } => list("ol", items),
            Block::Table(table) => table_html(table),
            Block::CodeBlock { lines, .. } => {
                let code: Vec<String> =
                    lines.iter().map(|l| preserve_spaces(&escape(l))).collect();
                format!(
                    "<pre style=\"{PRE_STYLE}\"><code>{}</code></pre>",
                    code.join("\n")
                )
            }
            Block::Blockquote { lines } => {
                let lines: Vec<String> = lines.iter().map(|l| inline(l)).collect();
                format!(
                    "<blockquote style=\"{QUOTE_STYLE}\">{}</blockquote>",
                    lines.join("<br>")
                )
            }
            Block::Image { source, alt } => self.image(source, alt),
        }
    }

    fn image(&mut self, source: &str, alt: &str) -> String {
        let payload = match ImageSource::parse(source) {
            ImageSource::Placeholder => return PLACEHOLDER_IMAGE.to_string(),
            ImageSource::Url(url) => self.resolver.fetch(&url),
            ImageSource::Data(uri) => ImagePayload::from_data_uri(&uri),
            ImageSource::Store(id) => self.resolver.resolve(&id),
        };
        match payload {
            Some(payload) => {
                let filename = media_filename(&payload);
                debug!("attaching {} as {}", payload.mime, filename);
                let tag = img_tag(&filename, alt);
                self.images.insert(filename, payload);
                tag
            }
            None => {
                let shown: String = source.chars().take(48).collect();
                warn!("image not found for flashcard: {}", shown);
                IMAGE_NOT_FOUND.to_string()
            }
        }
    }
}

fn list(tag: &str, items: &[String]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!("<li style=\"{LI_STYLE}\">{}</li>", inline(item)))
        .collect();
    format!("<{tag} style=\"{LIST_STYLE}\">{items}</{tag}>")
}

fn table_html(table: &Table) -> String {
    let cell = |tag: &str, style: &str, col: usize, text: &str| {
        let align = table.alignment(col).as_css();
        format!("<{tag} style=\"{style} text-align: {align};\">{}</{tag}>", inline(text))
    };

    let head: String = table
        .header
        .iter()
        .enumerate()
        .map(|(col, text)| cell("th", TH_STYLE, col, text))
        .collect();
    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .enumerate()
                .map(|(col, text)| cell("td", TD_STYLE, col, text))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table style=\"{TABLE_STYLE}\"><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>")
}

fn img_tag(src: &str, alt: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\" style=\"{IMG_STYLE}\">",
        escape(src),
        escape(alt)
    )
}

/// Unique media filename: `img_<unix millis>_<8 hex>.<ext>`.
fn media_filename(payload: &ImagePayload) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "img_{}_{}.{}",
        Utc::now().timestamp_millis(),
        &random[..8],
        payload.extension()
    )
}

/// Escapes text and converts inline markdown to HTML.
///
/// Code spans are set aside first so their contents stay literal.
pub fn inline(text: &str) -> String {
    let escaped = escape(text);

    let mut spans: Vec<String> = Vec::new();
    let protected = CODE_SPAN.replace_all(&escaped, |caps: &regex::Captures| {
        spans.push(caps[1].to_string());
        format!("\u{0}{}\u{0}", spans.len() - 1)
    });

    let html = WIKI_LINK.replace_all(&protected, |caps: &regex::Captures| {
        let label = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| caps[1].trim());
        format!("<strong>{label}</strong>")
    });
    let html = BOLD.replace_all(&html, "<strong>$1</strong>");
    let html = ITALIC.replace_all(&html, "<em>$1</em>");
    let html = LINK.replace_all(&html, |caps: &regex::Captures| {
        if is_safe_href(&caps[2]) {
            format!("<a href=\"{}\" style=\"{LINK_STYLE}\">{}</a>", &caps[2], &caps[1])
        } else {
            caps[1].to_string()
        }
    });

    PLACEHOLDER
        .replace_all(&html, |caps: &regex::Captures| {
            let code = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .map(String::as_str)
                .unwrap_or_default();
            format!("<code style=\"{CODE_STYLE}\">{code}</code>")
        })
        .into_owned()
}

/// Link targets allowed to become live `href`s.
fn is_safe_href(target: &str) -> bool {
    let lower = target.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{0}' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Keeps code indentation through whitespace collapsing.
fn preserve_spaces(line: &str) -> String {
    line.replace("  ", "&nbsp;&nbsp;").replace('\t', "&nbsp;&nbsp;&nbsp;&nbsp;")
}

/// Final pass: newlines become `<br>`, space runs collapse, tabs go, edges trimmed.
pub fn normalize(html: &str) -> String {
    let html = html
        .replace("\r\n", "\n")
        .replace("\n\n", "<br><br>")
        .replace('\n', "<br>")
        .replace('\t', "");
    SPACES.replace_all(&html, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MemoryImageStore, NoImages};
    use pretty_assertions::assert_eq;

    static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#" style="[^"]*""#).unwrap());

    fn unstyled(html: &str) -> String {
        STYLE_ATTR.replace_all(html, "").into_owned()
    }

    fn html(content: &str) -> String {
        unstyled(&content_to_html(content, &NoImages).html)
    }

    #[test]
    fn paragraph_and_list() {
        assert_eq!(html("Hello\n"), "<p>Hello</p>");
        assert_eq!(html("- one\n- two"), "<ul><li>one</li><li>two</li></ul>");
        assert_eq!(html("1. a\n2. b"), "<ol><li>a</li><li>b</li></ol>");
    }

    #[test]
    fn paragraph_lines_break() {
        assert_eq!(html("one\ntwo"), "<p>one<br>two</p>");
    }

    #[test]
    fn headings_map_to_three_levels() {
        assert_eq!(html("## A"), "<h2>A</h2>");
        assert_eq!(html("### B"), "<h3>B</h3>");
        assert_eq!(html("##### C"), "<h4>C</h4>");
    }

    #[test]
    fn inline_markup() {
        assert_eq!(
            unstyled(&inline("**b** and *i* and `x < y` and [site](https://a.org?q=1&r=2)")),
            "<strong>b</strong> and <em>i</em> and <code>x &lt; y</code> and <a href=\"https://a.org?q=1&amp;r=2\">site</a>"
        );
    }

    #[test]
    fn only_web_and_mail_links_are_live() {
        assert_eq!(
            unstyled(&inline("[mail](mailto:a@b.org) [run](javascript:alert) [f](file:///etc/passwd)")),
            "<a href=\"mailto:a@b.org\">mail</a> run f"
        );
        assert_eq!(unstyled(&inline("[x](JavaScript:void)")), "x");
    }

    #[test]
    fn code_span_content_stays_literal() {
        assert_eq!(unstyled(&inline("`**not bold**`")), "<code>**not bold**</code>");
    }

    #[test]
    fn wiki_links_become_bold() {
        assert_eq!(inline("see [[Cell Theory]]"), "see <strong>Cell Theory</strong>");
        assert_eq!(inline("[[Target|shown]]"), "<strong>shown</strong>");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(html("a <b> & \"c\""), "<p>a &lt;b&gt; &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn table_with_alignment() {
        let out = content_to_html("| L | C | R |\n|---|:---:|---:|\n| 1 | 2 | 3 |", &NoImages).html;
        assert!(out.contains("<table"));
        assert!(out.contains("text-align: center;\">C</th>"));
        assert!(out.contains("text-align: right;\">3</td>"));
        assert!(out.contains("text-align: left;\">1</td>"));
    }

    #[test]
    fn code_block_keeps_lines_and_indent() {
        assert_eq!(
            html("```rust\nfn main() {\n    run();\n}\n```"),
            "<pre><code>fn main() {<br>&nbsp;&nbsp;&nbsp;&nbsp;run();<br>}</code></pre>"
        );
    }

    #[test]
    fn blockquote_lines() {
        assert_eq!(html("> a\n> b"), "<blockquote>a<br>b</blockquote>");
    }

    #[test]
    fn stored_image_is_attached() {
        let mut store = MemoryImageStore::new();
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let id = store.add(ImagePayload::from_bytes(png));
        let card = content_to_html(&format!("![fig](store:{})", id.as_str()), &store);

        assert_eq!(card.images.len(), 1);
        let (name, payload) = card.images.iter().next().unwrap();
        assert!(name.starts_with("img_"));
        assert!(name.ends_with(".png"));
        assert_eq!(payload.mime, "image/png");
        assert!(card.html.contains(&format!("src=\"{name}\"")));
    }

    #[test]
    fn data_uri_image_is_attached() {
        let card = content_to_html("<img src=\"data:image/gif;base64,R0lGODlh\">", &NoImages);
        assert_eq!(card.images.len(), 1);
        assert!(card.images.keys().all(|k| k.ends_with(".gif")));
    }

    /// Answers every download with the same payload.
    struct Remote(ImagePayload);

    impl ImageResolver for Remote {
        fn resolve(&self, _id: &str) -> Option<ImagePayload> {
            None
        }

        fn fetch(&self, _url: &str) -> Option<ImagePayload> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn external_image_is_downloaded_and_attached() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let card = content_to_html(
            "![a](https://example.org/x.png)",
            &Remote(ImagePayload::from_bytes(png)),
        );
        assert_eq!(card.images.len(), 1);
        let name = card.images.keys().next().unwrap();
        assert!(name.ends_with(".png"));
        assert!(card.html.contains(&format!("src=\"{name}\"")));
        assert!(!card.html.contains("example.org"));
    }

    #[test]
    fn failed_download_missing_and_placeholder_images() {
        let card = content_to_html(
            "![a](https://example.org/x.png)\n\n![b](store:0123456789abcdef)\n\n![c](https://placehold.co/20)",
            &NoImages,
        );
        assert!(card.images.is_empty());
        assert!(!card.html.contains("example.org"));
        assert_eq!(card.html.matches(IMAGE_NOT_FOUND).count(), 2);
        assert!(card.html.contains(PLACEHOLDER_IMAGE));
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a\n\nb\nc\t   d  "), "a<br><br>b<br>c d");
    }
}
