//! Isolated test environment with temp directory.

use super::{CornellCommand, TestNote};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with temporary notes and output directories.
///
/// Everything lives under one temp directory that is removed on drop.
/// Commands get `--dir`, `--config` and `--output` pointed inside it.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    notes_dir: PathBuf,
    out_dir: PathBuf,
    config_path: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("notes");
        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create notes directory");
        let config_path = temp_dir.path().join("config.toml");
        Self {
            _temp_dir: temp_dir,
            notes_dir,
            out_dir,
            config_path,
        }
    }

    /// Returns the path to the notes directory.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Returns the directory exports are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Returns the default image store location.
    pub fn images_dir(&self) -> PathBuf {
        self.notes_dir.join(".images")
    }

    /// Writes a note built with [`TestNote`] as `<name>.md` and returns its path.
    pub fn add_note(&self, name: &str, note: &TestNote) -> PathBuf {
        self.write_note(name, &note.to_markdown())
    }

    /// Writes raw markdown as `<name>.md` and returns its path.
    pub fn write_note(&self, name: &str, content: &str) -> PathBuf {
        self.write_file(&format!("{name}.md"), content.as_bytes())
    }

    /// Writes a file into the notes directory and returns its path.
    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.notes_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes the config file passed with `--config`.
    pub fn write_config(&self, content: &str) {
        std::fs::write(&self.config_path, content).expect("Failed to write config");
    }

    /// Files in the output directory, sorted by name.
    pub fn outputs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.out_dir) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        paths.sort();
        paths
    }

    /// Creates a command configured for this test environment.
    pub fn cmd(&self) -> CornellCommand {
        CornellCommand::new()
            .dir(&self.notes_dir)
            .config(&self.config_path)
    }

    /// Creates an export command for a note, writing into [`Self::out_dir`].
    pub fn export(&self, note: &str) -> CornellCommand {
        self.cmd()
            .export(note)
            .args(["--output", self.out_dir.to_string_lossy().as_ref()])
    }

    /// Creates an `export --all` command writing into [`Self::out_dir`].
    pub fn export_all(&self) -> CornellCommand {
        self.cmd()
            .export_all()
            .args(["--output", self.out_dir.to_string_lossy().as_ref()])
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.notes_dir().is_dir());
        assert!(!env.out_dir().exists(), "output dir is created on export");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.notes_dir().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], env.notes_dir().to_string_lossy());
        assert_eq!(args[2], "--config");
    }

    #[test]
    fn test_env_add_note_creates_file() {
        let env = TestEnv::new();
        let path = env.add_note("cells", &TestNote::new("Cells").section("A", "b"));
        assert!(path.is_file());
        assert!(path.ends_with("cells.md"));
    }
}
