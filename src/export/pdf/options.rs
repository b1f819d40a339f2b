//! Page geometry and typographic constants for the Cornell layout.

use serde::{Deserialize, Serialize};

use crate::export::ExportError;

/// Layout constants, in points.
///
/// Every field can be overridden from the `[pdf]` table of the config file;
/// missing fields keep their defaults (A4 portrait).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Width of the left key-point column.
    pub key_column_width: f32,
    /// Gap between a column edge and its text.
    pub column_padding: f32,

    pub title_size: f32,
    pub heading_size: f32,
    pub key_heading_size: f32,
    pub body_size: f32,
    /// Size for code and table cells.
    pub small_size: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,

    pub block_spacing: f32,
    pub list_indent: f32,
    pub table_padding: f32,
    pub cell_padding: f32,
    pub row_height: f32,
    pub code_padding: f32,
    pub quote_indent: f32,
    pub max_image_height: f32,
    pub image_spacing: f32,
    pub section_spacing: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 40.0,
            key_column_width: 130.0,
            column_padding: 8.0,
            title_size: 24.0,
            heading_size: 16.0,
            key_heading_size: 12.0,
            body_size: 11.0,
            small_size: 10.0,
            line_spacing: 1.4,
            block_spacing: 6.0,
            list_indent: 12.0,
            table_padding: 10.0,
            cell_padding: 4.0,
            row_height: 18.0,
            code_padding: 6.0,
            quote_indent: 10.0,
            max_image_height: 300.0,
            image_spacing: 8.0,
            section_spacing: 14.0,
        }
    }
}

impl PdfLayout {
    /// Width of the right-hand notes column.
    ///
    /// ```
    /// use cornell::export::pdf::PdfLayout;
    ///
    /// assert_eq!(PdfLayout::default().notes_width(), 385.0);
    /// ```
    pub fn notes_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin - self.key_column_width
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y a draw may reach (top-down coordinates).
    pub fn bottom(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Height between the top and bottom margins.
    pub fn printable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Font size of a sub-heading of the given level (2..=6).
    pub fn heading_size_for(&self, level: u8) -> f32 {
        let step = 2.0 * f32::from(level.saturating_sub(1));
        (self.heading_size - step).max(self.body_size)
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing
    }

    /// Checks that the geometry leaves room for content.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidLayout` naming the first violated bound.
    pub fn validate(&self) -> Result<(), ExportError> {
        let sizes = [
            ("title_size", self.title_size),
            ("heading_size", self.heading_size),
            ("key_heading_size", self.key_heading_size),
            ("body_size", self.body_size),
            ("small_size", self.small_size),
            ("line_spacing", self.line_spacing),
            ("row_height", self.row_height),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ExportError::InvalidLayout(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.margin < 0.0 || self.printable_height() <= 0.0 {
            return Err(ExportError::InvalidLayout(
                "margins leave no printable height".into(),
            ));
        }
        if self.notes_width() - 2.0 * self.column_padding <= self.table_padding {
            return Err(ExportError::InvalidLayout(format!(
                "notes column is too narrow ({} pt)",
                self.notes_width()
            )));
        }
        if self.key_column_width <= 2.0 * self.column_padding {
            return Err(ExportError::InvalidLayout(
                "key column is narrower than its padding".into(),
            ));
        }
        if self.max_image_height <= 0.0 || self.max_image_height > self.printable_height() {
            return Err(ExportError::InvalidLayout(format!(
                "max_image_height must be within the printable height ({} pt)",
                self.printable_height()
            )));
        }
        let tallest_line = self.line_height(self.title_size.max(self.heading_size));
        if tallest_line > self.printable_height() {
            return Err(ExportError::InvalidLayout(
                "a single line is taller than the page".into(),
            ));
        }
        Ok(())
    }
}
