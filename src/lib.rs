//! cornell - Cornell-layout PDFs and flashcard packages from markdown notes

pub mod cli;
pub mod domain;
pub mod export;
pub mod infra;

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use cli::{
    Cli, Command, ImageCommand,
    config::Config,
    handlers::{
        handle_completions, handle_export, handle_image_add, handle_links, handle_sections,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let notes_dir = config.notes_dir(cli.dir.as_ref());
    debug!("notes directory: {}", notes_dir.display());

    match &cli.command {
        Command::Export(args) => handle_export(args, &notes_dir, &config),
        Command::Sections(args) => handle_sections(args, &notes_dir),
        Command::Links(args) => handle_links(args, &notes_dir),
        Command::Image(args) => match &args.command {
            ImageCommand::Add(add) => handle_image_add(add, &notes_dir, &config),
        },
        Command::Completions(args) => handle_completions(args),
    }
}

/// Warnings by default; each `-v` raises the level. `RUST_LOG` still applies.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
