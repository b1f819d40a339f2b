//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// cornell - Cornell-layout PDFs and flashcards from markdown notes
#[derive(Parser, Debug)]
#[command(name = "cornell", version, about, long_about = None)]
pub struct Cli {
    /// Notes directory (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export notes to a Cornell-layout PDF or an Anki flashcard package
    Export(ExportArgs),

    /// Show how a note splits into sections and blocks
    Sections(SectionsArgs),

    /// List the notes a note links to with [[Title]]
    Links(LinksArgs),

    /// Manage the image store
    Image(ImageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Export format for the `export` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Cornell-layout PDF
    #[default]
    Pdf,
    /// Anki flashcard package (zip)
    Anki,
}

/// Arguments for the `export` command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Note file to export (path, or name inside the notes directory).
    /// Required unless --all is used.
    #[arg(required_unless_present = "all")]
    pub note: Option<PathBuf>,

    /// Export every note in the notes directory
    #[arg(long, conflicts_with = "note")]
    pub all: bool,

    /// Export format
    #[arg(short = 'F', long = "format", value_enum, default_value_t = ExportFormat::Pdf)]
    pub export_format: ExportFormat,

    /// Output directory (defaults to config `output`, then the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Font style for PDFs (sans, serif, mixed)
    #[arg(long)]
    pub style: Option<String>,

    /// Image store directory (defaults to <dir>/.images)
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Skip images referenced by http(s) URLs instead of downloading them
    #[arg(long)]
    pub offline: bool,

    /// CLI output format (for status messages, not export content)
    #[arg(long = "cli-format", value_enum, default_value_t = OutputFormat::Human)]
    pub cli_format: OutputFormat,
}

/// Arguments for the `sections` command
#[derive(Parser, Debug)]
pub struct SectionsArgs {
    /// Note file (path, or name inside the notes directory)
    pub note: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `links` command
#[derive(Parser, Debug)]
pub struct LinksArgs {
    /// Note file (path, or name inside the notes directory)
    pub note: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `image` command
#[derive(Parser, Debug)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub command: ImageCommand,
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Copy an image into the store and print its reference
    Add(ImageAddArgs),
}

/// Arguments for the `image add` command
#[derive(Parser, Debug)]
pub struct ImageAddArgs {
    /// Image file to store
    pub file: PathBuf,

    /// Image store directory (defaults to <dir>/.images)
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_defaults_to_pdf() {
        let cli = Cli::parse_from(["cornell", "export", "note.md"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.export_format, ExportFormat::Pdf);
        assert_eq!(args.note, Some(PathBuf::from("note.md")));
        assert!(!args.all);
    }

    #[test]
    fn export_all_conflicts_with_note() {
        assert!(Cli::try_parse_from(["cornell", "export", "a.md", "--all"]).is_err());
        assert!(Cli::try_parse_from(["cornell", "export"]).is_err());
        assert!(Cli::try_parse_from(["cornell", "export", "--all", "-F", "anki"]).is_ok());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["cornell", "-vv", "links", "a.md"]);
        assert_eq!(cli.verbose, 2);
    }
}
