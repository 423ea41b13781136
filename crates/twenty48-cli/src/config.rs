use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use twenty48_core::Rules;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Seed for tile spawns (and simulated moves). Absent means entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub rules: Rules,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub simulate: Simulate,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Storage {
    /// File holding the best score as a single integer.
    #[serde(default = "defaults::best_score_file")]
    pub best_score_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Simulate {
    #[serde(default = "defaults::games")]
    pub games: u32,
    /// Safety cap on moves per simulated game.
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            rules: Rules::default(),
            storage: Storage::default(),
            simulate: Simulate::default(),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self { best_score_file: defaults::best_score_file() }
    }
}

impl Default for Simulate {
    fn default() -> Self {
        Self { games: defaults::games(), max_moves: defaults::max_moves() }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        cfg.rules
            .validate()
            .with_context(|| format!("invalid [rules] in {}", path.display()))?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_toml(p),
            None => Ok(Self::default()),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn best_score_file() -> PathBuf { PathBuf::from("twenty48-best-score.txt") }
    pub fn games() -> u32 { 100 }
    pub fn max_moves() -> u64 { 100_000 }
}
