//! Application configuration.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use sketchset_core::board::DEFAULT_BOARD_SIZE;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every command.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of raw session records read by the dataset generator.
    pub raw_dir: PathBuf,
    /// Output directory of the dataset generator.
    pub dataset_dir: PathBuf,
    /// Width and height of the drawing surface and of rendered images.
    pub surface_size: u32,
    /// Drawings per raw file, used for progress reporting.
    pub labels_per_session: usize,
    /// JSON array of labels; the built-in list when unset.
    pub labels_file: Option<PathBuf>,
    /// Where saved session records go; the platform data dir when unset.
    pub sessions_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            dataset_dir: PathBuf::from("data/dataset"),
            surface_size: DEFAULT_BOARD_SIZE,
            labels_per_session: sketchset_core::DEFAULT_LABELS.len(),
            labels_file: None,
            sessions_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.surface_size == 0 || self.surface_size > u32::from(u16::MAX) {
            anyhow::bail!("surface_size must be between 1 and {}", u16::MAX);
        }
        Ok(())
    }

    /// Per-sample path sets: `{dataset_dir}/json`.
    pub fn json_dir(&self) -> PathBuf {
        self.dataset_dir.join("json")
    }

    /// Per-sample images: `{dataset_dir}/img`.
    pub fn img_dir(&self) -> PathBuf {
        self.dataset_dir.join("img")
    }

    /// Sample metadata: `{dataset_dir}/samples.json`.
    pub fn samples_path(&self) -> PathBuf {
        self.dataset_dir.join("samples.json")
    }
}
