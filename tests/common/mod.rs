//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::io::Cursor;

/// Encodes a solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes
}

/// Lists the entry names of a zip archive.
pub fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Not a zip archive");
    archive.file_names().map(str::to_string).collect()
}

/// Reads one entry of a zip archive as UTF-8.
pub fn zip_text(bytes: &[u8], name: &str) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Not a zip archive");
    let mut file = archive.by_name(name).expect("Missing zip entry");
    let mut text = String::new();
    file.read_to_string(&mut text).expect("Entry is not UTF-8");
    text
}
