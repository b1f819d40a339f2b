//! Handler for the `export` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::cli::config::Config;
use crate::cli::output::{ExportFailure, ExportListing};
use crate::cli::{ExportArgs, ExportFormat};
use crate::export::{FontStyle, export_flashcards, export_pdf};
use crate::infra::{
    DirImageStore, FetchingResolver, HttpFetcher, ImageResolver, flashcards_filename,
    pdf_filename, read_document, scan_notes_directory, write_output,
};

use super::{print_output, resolve_note_path};

/// Settings shared by every note of one `export` run.
struct ExportJob<'a> {
    format: ExportFormat,
    output_dir: PathBuf,
    images: Box<dyn ImageResolver>,
    style: FontStyle,
    config: &'a Config,
}

/// Result of a bulk export.
#[derive(Debug, Serialize)]
struct BulkResult {
    exported: Vec<ExportListing>,
    failed: Vec<ExportFailure>,
}

/// Handle the `export` command.
pub fn handle_export(args: &ExportArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let job = ExportJob {
        format: args.export_format,
        output_dir: config.output_dir(args.output.as_ref()),
        images: image_resolver(args, notes_dir, config)?,
        style: config.style(args.style.as_deref()),
        config,
    };

    match (&args.note, args.all) {
        (Some(note), false) => {
            let path = resolve_note_path(note, notes_dir)?;
            let listing = job.export(&path)?;
            let human = format!(
                "Exported '{}' to {} ({})",
                listing.title,
                listing.path,
                describe(&listing)
            );
            let paths = [listing.path.clone()];
            print_output(args.cli_format, listing, &human, &paths)
        }
        (None, true) => handle_bulk_export(args, &job, notes_dir),
        _ => bail!("specify a note to export or use --all"),
    }
}

/// The image store, wrapped with a downloader unless running offline.
fn image_resolver(
    args: &ExportArgs,
    notes_dir: &Path,
    config: &Config,
) -> Result<Box<dyn ImageResolver>> {
    let store = DirImageStore::new(config.images_dir(args.images.as_ref(), notes_dir));
    if args.offline {
        debug!("offline: external images are skipped");
        return Ok(Box::new(store));
    }
    let fetcher =
        HttpFetcher::new(config.fetch_timeout()).context("failed to set up image downloads")?;
    Ok(Box::new(FetchingResolver::new(store, fetcher)))
}

fn handle_bulk_export(args: &ExportArgs, job: &ExportJob, notes_dir: &Path) -> Result<()> {
    let notes = scan_notes_directory(notes_dir)
        .with_context(|| format!("failed to scan {}", notes_dir.display()))?;
    if notes.is_empty() {
        bail!("no notes found in {}", notes_dir.display());
    }

    let mut result = BulkResult {
        exported: Vec::new(),
        failed: Vec::new(),
    };
    for path in &notes {
        match job.export(path) {
            Ok(listing) => result.exported.push(listing),
            Err(err) => {
                warn!("skipping {}: {:#}", path.display(), err);
                result.failed.push(ExportFailure {
                    source: path.display().to_string(),
                    error: format!("{err:#}"),
                });
            }
        }
    }

    if result.exported.is_empty() {
        bail!("none of the {} notes could be exported", notes.len());
    }

    let mut human: Vec<String> = result
        .exported
        .iter()
        .map(|l| format!("  {} ({})", l.path, describe(l)))
        .collect();
    human.insert(
        0,
        format!(
            "Exported {} of {} notes to {}",
            result.exported.len(),
            notes.len(),
            job.output_dir.display()
        ),
    );
    for failure in &result.failed {
        human.push(format!("  skipped {}: {}", failure.source, failure.error));
    }

    let paths: Vec<String> = result.exported.iter().map(|l| l.path.clone()).collect();
    print_output(args.cli_format, &result, &human.join("\n"), &paths)
}

impl ExportJob<'_> {
    fn export(&self, source: &Path) -> Result<ExportListing> {
        let doc = read_document(source)
            .with_context(|| format!("failed to read note: {}", source.display()))?;

        let (filename, bytes, units, images, format) = match self.format {
            ExportFormat::Pdf => {
                let pdf = export_pdf(&doc, self.images.as_ref(), &self.config.pdf, self.style)
                    .with_context(|| format!("cannot export '{}'", doc.title))?;
                (pdf_filename(&doc.title), pdf.bytes, pdf.page_count, None, "pdf")
            }
            ExportFormat::Anki => {
                let package = export_flashcards(&doc, self.images.as_ref())
                    .with_context(|| format!("cannot export '{}'", doc.title))?;
                (
                    flashcards_filename(&doc.title, Utc::now()),
                    package.bytes,
                    package.card_count,
                    Some(package.image_count),
                    "anki",
                )
            }
        };

        let written = write_output(&self.output_dir, &filename, &bytes)
            .with_context(|| format!("failed to write {}", filename))?;
        info!("exported {} to {}", source.display(), written.display());

        Ok(ExportListing {
            title: doc.title,
            source: source.display().to_string(),
            path: written.display().to_string(),
            format: format.to_string(),
            units,
            images,
        })
    }
}

fn describe(listing: &ExportListing) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    match listing.images {
        None => plural(listing.units, "page"),
        Some(images) => format!(
            "{}, {}",
            plural(listing.units, "card"),
            plural(images, "image")
        ),
    }
}
