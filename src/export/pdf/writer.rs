//! Serialises a [`Canvas`] into PDF bytes.
//!
//! Fonts are the standard base-14 faces with WinAnsi encoding, so no font
//! program is embedded. Images become Flate-compressed RGB XObjects and every
//! content stream is Flate-compressed.

use std::collections::BTreeSet;
use std::io::Write as IoWrite;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use log::debug;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::export::error::RenderError;
use crate::export::pdf::canvas::{Canvas, Color, DrawOp};
use crate::export::pdf::fonts::BuiltinFont;

const PRODUCER: &str = concat!("cornell ", env!("CARGO_PKG_VERSION"));

/// Sequential object id allocator.
struct Refs(i32);

impl Refs {
    fn next(&mut self) -> Ref {
        self.0 += 1;
        Ref::new(self.0)
    }
}

/// Writes the canvas as a complete PDF document.
pub(crate) fn write_pdf(canvas: &Canvas, title: &str) -> Result<Vec<u8>, RenderError> {
    let mut refs = Refs(0);
    let catalog_id = refs.next();
    let tree_id = refs.next();
    let info_id = refs.next();

    let fonts: Vec<BuiltinFont> = canvas
        .pages
        .iter()
        .flat_map(|page| page.ops.iter())
        .filter_map(|op| match op {
            DrawOp::Text { font, .. } => Some(*font),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let font_ids: Vec<Ref> = fonts.iter().map(|_| refs.next()).collect();
    let font_names: Vec<String> = (1..=fonts.len()).map(|i| format!("F{i}")).collect();

    let image_ids: Vec<Ref> = canvas.images.iter().map(|_| refs.next()).collect();
    let image_names: Vec<String> = (1..=canvas.images.len()).map(|i| format!("Im{i}")).collect();

    let page_ids: Vec<(Ref, Ref)> = canvas
        .pages
        .iter()
        .map(|_| (refs.next(), refs.next()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    for (font, id) in fonts.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(font.base_name().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (image, id) in canvas.images.iter().zip(&image_ids) {
        let data = deflate(&image.rgb)?;
        let mut xobject = pdf.image_xobject(*id, &data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width as i32);
        xobject.height(image.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }

    for (index, (page_id, content_id)) in page_ids.iter().enumerate() {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, canvas.width, canvas.height));
        page.parent(tree_id);
        page.contents(*content_id);

        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for (name, id) in font_names.iter().zip(&font_ids) {
            font_dict.pair(Name(name.as_bytes()), *id);
        }
        font_dict.finish();
        let mut xobjects = resources.x_objects();
        for (name, id) in image_names.iter().zip(&image_ids) {
            xobjects.pair(Name(name.as_bytes()), *id);
        }
        xobjects.finish();
        resources.finish();
        page.finish();

        let stream = page_content(canvas, index, &fonts, &font_names, &image_names);
        let compressed = deflate(&stream)?;
        pdf.stream(*content_id, &compressed)
            .filter(Filter::FlateDecode);
    }

    let bytes = pdf.finish();
    debug!(
        "serialised {} pages, {} fonts, {} images ({} bytes)",
        page_ids.len(),
        fonts.len(),
        canvas.images.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn page_content(
    canvas: &Canvas,
    index: usize,
    fonts: &[BuiltinFont],
    font_names: &[String],
    image_names: &[String],
) -> Vec<u8> {
    let flip = |y: f32| canvas.height - y;
    let mut content = Content::new();

    for op in &canvas.pages[index].ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                let Some(slot) = fonts.iter().position(|f| f == font) else {
                    continue;
                };
                let encoded = encode_win_ansi(text);
                set_fill(&mut content, *color);
                content.begin_text();
                content.set_font(Name(font_names[slot].as_bytes()), *size);
                content.next_line(*x, flip(*y));
                content.show(Str(&encoded));
                content.end_text();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                content.set_stroke_rgb(color.0, color.1, color.2);
                content.set_line_width(*width);
                content.move_to(*x1, flip(*y1));
                content.line_to(*x2, flip(*y2));
                content.stroke();
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                set_fill(&mut content, *color);
                content.rect(*x, flip(y + height), *width, *height);
                content.fill_nonzero();
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                index,
            } => {
                let Some(name) = image_names.get(*index) else {
                    continue;
                };
                content.save_state();
                content.transform([*width, 0.0, 0.0, *height, *x, flip(y + height)]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }

    content.finish()
}

fn set_fill(content: &mut Content, color: Color) {
    content.set_fill_rgb(color.0, color.1, color.2);
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Encodes text for a WinAnsi font. Characters outside the code page become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::pdf::canvas::RasterImage;
    use pretty_assertions::assert_eq;

    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::new(200.0, 300.0);
        canvas.push(
            0,
            DrawOp::Text {
                x: 10.0,
                y: 20.0,
                font: BuiltinFont::Helvetica,
                size: 11.0,
                color: Color::BLACK,
                text: "Hello".into(),
            },
        );
        let page = canvas.add_page();
        canvas.push(
            page,
            DrawOp::Line {
                x1: 0.0,
                y1: 10.0,
                x2: 100.0,
                y2: 10.0,
                width: 0.5,
                color: Color::RULE,
            },
        );
        canvas
    }

    #[test]
    fn writes_pdf_header_and_trailer() {
        let bytes = write_pdf(&sample_canvas(), "Test").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len() - 32..]).to_string();
        assert!(tail.contains("%%EOF"));
    }

    #[test]
    fn declares_page_count_and_fonts() {
        let bytes = write_pdf(&sample_canvas(), "Test").unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/WinAnsiEncoding"));
    }

    #[test]
    fn embeds_images_as_xobjects() {
        let mut canvas = Canvas::new(200.0, 300.0);
        let index = canvas.add_image(RasterImage {
            width: 2,
            height: 1,
            rgb: vec![255, 0, 0, 0, 0, 255],
        });
        canvas.push(
            0,
            DrawOp::Image {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 10.0,
                index,
            },
        );
        let bytes = write_pdf(&canvas, "Img").unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/Im1"));
    }

    #[test]
    fn output_is_deterministic() {
        let a = write_pdf(&sample_canvas(), "Same").unwrap();
        let b = write_pdf(&sample_canvas(), "Same").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn win_ansi_maps_common_punctuation() {
        assert_eq!(encode_win_ansi("a•b"), vec![b'a', 0x95, b'b']);
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
        assert_eq!(encode_win_ansi("→"), vec![b'?']);
    }
}
