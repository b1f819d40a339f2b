//! Image references and payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Prefix marking an image stored in the image store.
pub const STORE_PREFIX: &str = "store:";

/// Hosts serving stand-in images that are never worth embedding.
const PLACEHOLDER_HOSTS: &[&str] = &["via.placeholder.com", "placehold.co", "placehold.it"];

/// Where an image reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:` URI carrying the payload itself.
    Data(String),
    /// External `http(s)` URL.
    Url(String),
    /// A stand-in image with no real content.
    Placeholder,
    /// Opaque id resolved through the image store.
    Store(String),
}

impl ImageSource {
    /// Classifies the `src` of an image.
    ///
    /// ```
    /// use cornell::domain::ImageSource;
    ///
    /// assert_eq!(ImageSource::parse("store:ab12"), ImageSource::Store("ab12".into()));
    /// assert_eq!(ImageSource::parse("placeholder"), ImageSource::Placeholder);
    /// assert!(matches!(ImageSource::parse("https://x.org/a.png"), ImageSource::Url(_)));
    /// ```
    pub fn parse(src: &str) -> Self {
        let src = src.trim();
        let lower = src.to_ascii_lowercase();

        if lower.starts_with("data:") {
            return ImageSource::Data(src.to_string());
        }
        if lower.starts_with("placeholder") {
            return ImageSource::Placeholder;
        }
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
        {
            if PLACEHOLDER_HOSTS.iter().any(|host| lower.contains(host)) {
                return ImageSource::Placeholder;
            }
            return ImageSource::Url(src.to_string());
        }

        let id = src.strip_prefix(STORE_PREFIX).unwrap_or(src);
        ImageSource::Store(id.to_string())
    }
}

/// Binary image content with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Wraps raw bytes, detecting the MIME type from magic bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = sniff_mime(&bytes)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self { mime, bytes }
    }

    /// Decodes a `data:<mime>[;base64],<data>` URI.
    ///
    /// Returns `None` for malformed URIs or invalid base64.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.trim().strip_prefix("data:")?;
        let (meta, data) = rest.split_once(',')?;

        let mut parts = meta.split(';');
        let declared = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD.decode(cleaned).ok()?
        } else {
            data.as_bytes().to_vec()
        };

        let mime = if declared.is_empty() {
            sniff_mime(&bytes).unwrap_or("application/octet-stream").to_string()
        } else {
            declared
        };

        Some(Self { mime, bytes })
    }

    /// File extension derived from the MIME type, `jpg` when unknown.
    ///
    /// ```
    /// use cornell::domain::ImagePayload;
    ///
    /// let png = ImagePayload { mime: "image/png".into(), bytes: vec![] };
    /// assert_eq!(png.extension(), "png");
    /// let odd = ImagePayload { mime: "application/x-foo".into(), bytes: vec![] };
    /// assert_eq!(odd.extension(), "jpg");
    /// ```
    pub fn extension(&self) -> &'static str {
        mime_extension(&self.mime)
    }
}

/// Maps an image MIME type to a file extension, defaulting to `jpg`.
pub fn mime_extension(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}

/// Detects an image MIME type from magic bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }
    let head = std::str::from_utf8(&data[..data.len().min(256)]).ok()?;
    if head.contains("<svg") {
        return Some("image/svg+xml");
    }
    None
}
