//! Resolves database names to files on disk.

use crate::error::{RewardError, Result};
use std::path::{Path, PathBuf};

/// Maps a database name to `<base_dir>/<name>/<name>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseLocator {
    base_dir: PathBuf,
    extension: String,
}

impl DatabaseLocator {
    /// Creates a locator rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// Returns the path a name maps to, without touching the filesystem.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(name)
            .join(format!("{name}.{}", self.extension))
    }

    /// Resolves a name to an existing database file.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(RewardError::resolution(format!(
                "Invalid database name '{name}'"
            )));
        }

        let path = self.path_for(name);
        if !path.is_file() {
            return Err(RewardError::resolution(format!(
                "Database '{name}' not found at {}",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Returns the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for DatabaseLocator {
    fn default() -> Self {
        Self::new(Path::new("spider").join("database"), "sqlite")
    }
}
