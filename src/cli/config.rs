//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::export::{FontStyle, PdfLayout};
use crate::infra::DEFAULT_FETCH_TIMEOUT;

/// Application configuration loaded from config file.
///
/// ```toml
/// dir = "~/notes"
/// output = "~/exports"
/// style = "serif"
/// fetch_timeout = 10
///
/// [pdf]
/// margin = 36.0
/// key_column_width = 150.0
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default notes directory
    pub dir: Option<PathBuf>,

    /// Image store directory
    pub images: Option<PathBuf>,

    /// Directory exports are written to
    pub output: Option<PathBuf>,

    /// Font style preset for PDFs
    pub style: Option<String>,

    /// Seconds to wait for one image download
    pub fetch_timeout: Option<u64>,

    /// Page geometry overrides
    pub pdf: PdfLayout,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/cornell/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cornell")
            .join("config.toml")
    }

    /// Resolve the notes directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. Current working directory
    pub fn notes_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the image store directory.
    ///
    /// Precedence: CLI `--images`, config `images`, then `<notes dir>/.images`.
    pub fn images_dir(&self, cli_images: Option<&PathBuf>, notes_dir: &Path) -> PathBuf {
        cli_images
            .cloned()
            .or_else(|| self.images.clone())
            .unwrap_or_else(|| notes_dir.join(".images"))
    }

    /// Resolve the export directory.
    ///
    /// Precedence: CLI `--output`, config `output`, then the current directory.
    pub fn output_dir(&self, cli_output: Option<&PathBuf>) -> PathBuf {
        cli_output
            .cloned()
            .or_else(|| self.output.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the font style. Unknown names fall back to the default style.
    pub fn style(&self, cli_style: Option<&str>) -> FontStyle {
        FontStyle::resolve(cli_style.or(self.style.as_deref()))
    }

    /// Timeout for downloading external images.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }
}
