use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use twenty48_core::engine::Score;

/// Best score kept in a file as one plain integer.
///
/// Read once at startup, written only when a session beats the stored value.
#[derive(Debug, Clone)]
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored best score; a missing or empty file counts as 0.
    pub fn load(&self) -> Result<Score> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse()
            .with_context(|| format!("{} does not hold an integer score", self.path.display()))
    }

    /// Write `score` if it beats the stored value. Returns whether it wrote.
    pub fn save_if_higher(&self, score: Score) -> Result<bool> {
        let current = self.load()?;
        if score <= current {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{score}\n"))
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!("best score {score} saved to {}", self.path.display());
        Ok(true)
    }
}
