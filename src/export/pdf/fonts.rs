//! Built-in PDF fonts, their metrics and the font-pairing presets.
//!
//! Only the standard base-14 faces are used, so nothing has to be embedded.
//! Glyph widths come from the Adobe font metrics in units of 1/1000 em, one
//! table per face (Helvetica-Oblique shares the upright widths).

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::Serialize;

/// Helvetica advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Times-Roman advance widths for ASCII 32..=126.
#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Times-Bold advance widths for ASCII 32..=126.
#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Times-Italic advance widths for ASCII 32..=126.
#[rustfmt::skip]
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

const COURIER_WIDTH: u16 = 600;

/// One of the standard PDF faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    Courier,
}

impl BuiltinFont {
    /// PostScript name written into the PDF.
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::TimesRoman => "Times-Roman",
            BuiltinFont::TimesBold => "Times-Bold",
            BuiltinFont::TimesItalic => "Times-Italic",
            BuiltinFont::Courier => "Courier",
        }
    }

    fn glyph_width(&self, c: char) -> u16 {
        let table = match self {
            BuiltinFont::Courier => return COURIER_WIDTH,
            BuiltinFont::Helvetica | BuiltinFont::HelveticaOblique => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
            BuiltinFont::TimesRoman => &TIMES_WIDTHS,
            BuiltinFont::TimesBold => &TIMES_BOLD_WIDTHS,
            BuiltinFont::TimesItalic => &TIMES_ITALIC_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            '\u{2022}' => 350,
            '\u{2013}' => table[b'-' as usize - 32],
            '\u{2014}' => 1000,
            _ => table[b'n' as usize - 32],
        }
    }

    /// Width of `text` set at `size` points.
    ///
    /// ```
    /// use cornell::export::pdf::BuiltinFont;
    ///
    /// assert_eq!(BuiltinFont::Courier.text_width("abcd", 10.0), 24.0);
    /// ```
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

/// A family with its regular, bold and italic faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontFamily {
    Helvetica,
    Times,
}

impl FontFamily {
    pub fn regular(&self) -> BuiltinFont {
        match self {
            FontFamily::Helvetica => BuiltinFont::Helvetica,
            FontFamily::Times => BuiltinFont::TimesRoman,
        }
    }

    pub fn bold(&self) -> BuiltinFont {
        match self {
            FontFamily::Helvetica => BuiltinFont::HelveticaBold,
            FontFamily::Times => BuiltinFont::TimesBold,
        }
    }

    pub fn italic(&self) -> BuiltinFont {
        match self {
            FontFamily::Helvetica => BuiltinFont::HelveticaOblique,
            FontFamily::Times => BuiltinFont::TimesItalic,
        }
    }
}

/// Font pairing selected for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Helvetica throughout.
    #[default]
    Sans,
    /// Times throughout.
    Serif,
    /// Times titles over Helvetica body text.
    Mixed,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Sans, FontStyle::Serif, FontStyle::Mixed];

    pub fn name(&self) -> &'static str {
        match self {
            FontStyle::Sans => "sans",
            FontStyle::Serif => "serif",
            FontStyle::Mixed => "mixed",
        }
    }

    /// Family used for the document title and headings.
    pub fn title_family(&self) -> FontFamily {
        match self {
            FontStyle::Sans => FontFamily::Helvetica,
            FontStyle::Serif | FontStyle::Mixed => FontFamily::Times,
        }
    }

    /// Family used for body text.
    pub fn body_family(&self) -> FontFamily {
        match self {
            FontStyle::Sans | FontStyle::Mixed => FontFamily::Helvetica,
            FontStyle::Serif => FontFamily::Times,
        }
    }

    /// Face used for code, regardless of the pairing.
    pub fn code_font(&self) -> BuiltinFont {
        BuiltinFont::Courier
    }

    /// Resolves a preset name, falling back to the default pairing.
    ///
    /// An unknown name is logged and never an error.
    ///
    /// ```
    /// use cornell::export::pdf::FontStyle;
    ///
    /// assert_eq!(FontStyle::resolve(Some("Serif")), FontStyle::Serif);
    /// assert_eq!(FontStyle::resolve(Some("comic")), FontStyle::Sans);
    /// assert_eq!(FontStyle::resolve(None), FontStyle::Sans);
    /// ```
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => Self::default(),
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(
                    "unknown font style '{}', using '{}'",
                    name,
                    Self::default().name()
                );
                Self::default()
            }),
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown font style name.
#[derive(Debug, Clone)]
pub struct ParseFontStyleError(String);

impl fmt::Display for ParseFontStyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown font style '{}' (expected sans, serif or mixed)", self.0)
    }
}

impl std::error::Error for ParseFontStyleError {}

impl FromStr for FontStyle {
    type Err = ParseFontStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FontStyle::ALL
            .into_iter()
            .find(|style| style.name() == normalized)
            .ok_or_else(|| ParseFontStyleError(s.to_string()))
    }
}

/// Greedily wraps text into lines no wider than `max_width`.
///
/// Words are split on whitespace; a word wider than the column is broken
/// between characters. Always returns at least one line.
pub fn wrap_text(text: &str, font: BuiltinFont, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let space = font.text_width(" ", size);
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = font.text_width(word, size);

        if word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = break_word(word, font, size, max_width);
            let last = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            current_width = font.text_width(&last, size);
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_word(word: &str, font: BuiltinFont, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        let mut candidate = piece.clone();
        candidate.push(c);
        if !piece.is_empty() && font.text_width(&candidate, size) > max_width {
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        } else {
            piece = candidate;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
