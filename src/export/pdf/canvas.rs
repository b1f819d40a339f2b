//! Recorded drawing operations, one list per page.
//!
//! Coordinates are top-down: `y` grows towards the bottom of the page and
//! text is positioned by its baseline. The writer flips them when the
//! document is serialised.

use serde::Serialize;

use crate::export::pdf::fonts::BuiltinFont;

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color(pub f32, pub f32, pub f32);

impl Color {
    pub const BLACK: Color = Color(0.0, 0.0, 0.0);
    /// Secondary text: summaries, blockquotes, continuation labels.
    pub const MUTED: Color = Color(0.4, 0.4, 0.4);
    /// Column dividers and section rules.
    pub const RULE: Color = Color(0.75, 0.75, 0.75);
    /// Code block background.
    pub const TINT: Color = Color(0.95, 0.95, 0.95);
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: BuiltinFont,
        size: f32,
        color: Color,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    },
    /// Filled rectangle whose top-left corner is `(x, y)`.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Placed raster image; `index` points into [`Canvas::images`].
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        index: usize,
    },
}

impl DrawOp {
    /// Vertical extent `(top, bottom)` of the op.
    pub fn vertical_extent(&self) -> (f32, f32) {
        match self {
            DrawOp::Text { y, .. } => (*y, *y),
            DrawOp::Line { y1, y2, .. } => (y1.min(*y2), y1.max(*y2)),
            DrawOp::Rect { y, height, .. } | DrawOp::Image { y, height, .. } => (*y, y + height),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Decoded image pixels ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// 8-bit RGB triples, row-major.
    pub rgb: Vec<u8>,
}

/// All pages of a document under construction.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
    pub images: Vec<RasterImage>,
}

impl Canvas {
    /// Creates a canvas holding one empty page.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::default()],
            images: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends an empty page and returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Records an op on the given page.
    ///
    /// # Panics
    ///
    /// Panics if `page` was never added.
    pub fn push(&mut self, page: usize, op: DrawOp) {
        self.pages[page].ops.push(op);
    }

    /// Stores decoded pixels and returns the index used by [`DrawOp::Image`].
    pub fn add_image(&mut self, image: RasterImage) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    /// Iterates over all text ops as `(page, x, y, text)`.
    pub fn texts(&self) -> impl Iterator<Item = (usize, f32, f32, &str)> {
        self.pages.iter().enumerate().flat_map(|(page, p)| {
            p.ops.iter().filter_map(move |op| match op {
                DrawOp::Text { x, y, text, .. } => Some((page, *x, *y, text.as_str())),
                _ => None,
            })
        })
    }
}
