//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility shared by several test crates
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Fluent wrapper around `assert_cmd::Command` for the `cornell` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct CornellCommand {
    args: Vec<String>,
}

impl CornellCommand {
    /// Creates a new command for the `cornell` binary.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Sets the `--dir` option to specify the notes directory.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Points `--config` at a file, so the user's real config is never read.
    pub fn config(mut self, path: &Path) -> Self {
        self.args.push("--config".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("cornell").expect("Failed to find cornell binary");
        cmd.args(&self.args);
        cmd.env_remove("RUST_LOG");
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `export` command with a note.
    pub fn export(self, note: &str) -> Self {
        self.args(["export", note])
    }

    /// Configures for the `export --all` command.
    pub fn export_all(self) -> Self {
        self.args(["export", "--all"])
    }

    /// Configures for the `sections` command with a note.
    pub fn sections(self, note: &str) -> Self {
        self.args(["sections", note])
    }

    /// Configures for the `links` command with a note.
    pub fn links(self, note: &str) -> Self {
        self.args(["links", note])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Selects the Anki export format.
    pub fn anki(self) -> Self {
        self.args(["--format", "anki"])
    }

    /// Adds `--format json` to a listing command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }

    /// Adds `--format paths` to a listing command.
    pub fn format_paths(self) -> Self {
        self.args(["--format", "paths"])
    }

    /// Adds `--cli-format json` to an export command.
    pub fn cli_json(self) -> Self {
        self.args(["--cli-format", "json"])
    }
}

impl Default for CornellCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ===========================================
    // CornellCommand Basics
    // ===========================================

    #[test]
    fn test_command_runs_binary() {
        CornellCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_dir() {
        let temp = TempDir::new().unwrap();
        let cmd = CornellCommand::new().dir(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_output_success() {
        let output = CornellCommand::new().args(["--help"]).output_success();
        assert!(output.contains("cornell") || output.contains("Cornell"));
    }
}
