//! Dataset generation from raw session records.
//!
//! Every drawing of every raw record becomes one sample with a running id:
//! `json/{id}.json` holds its paths, `img/{id}.png` its rendering on a
//! transparent background, and `samples.json` lists the metadata of all
//! samples. Raw files that do not parse as records are skipped.

use crate::config::AppConfig;
use crate::progress::Progress;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use sketchset_core::raster::{Background, Rasterizer};
use sketchset_core::session::{SessionId, SessionRecord};
use sketchset_render::write_png;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Metadata of one generated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: u64,
    pub label: String,
    pub user_name: String,
    pub user_id: SessionId,
}

/// Raw record files in `dir`, sorted by file name.
pub fn raw_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read raw directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Generate the dataset described by `config`, reporting progress to `out`.
pub fn generate<R, W>(
    config: &AppConfig,
    rasterizer: &mut R,
    out: W,
) -> anyhow::Result<Vec<Sample>>
where
    R: Rasterizer + ?Sized,
    W: Write,
{
    let files = raw_files(&config.raw_dir)?;
    log::info!(
        "Generating dataset from {} raw files in {}",
        files.len(),
        config.raw_dir.display()
    );

    let json_dir = config.json_dir();
    let img_dir = config.img_dir();
    for dir in [&json_dir, &img_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("create directory '{}'", dir.display()))?;
    }

    let mut progress = Progress::new(out, files.len() * config.labels_per_session);
    let mut samples = Vec::new();
    let mut id = 1;

    for file in &files {
        let json = fs::read_to_string(file)
            .with_context(|| format!("read raw file '{}'", file.display()))?;
        let record = match SessionRecord::from_json(&json) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping raw file {}: {}", file.display(), e);
                continue;
            }
        };

        for (label, paths) in record.drawings.iter() {
            let json_path = json_dir.join(format!("{}.json", id));
            let paths_json = serde_json::to_string(paths)?;
            fs::write(&json_path, paths_json)
                .with_context(|| format!("write '{}'", json_path.display()))?;

            let surface = rasterizer
                .render_on(
                    paths,
                    config.surface_size,
                    config.surface_size,
                    Background::Transparent,
                )
                .with_context(|| format!("render sample {}", id))?;
            write_png(&img_dir.join(format!("{}.png", id)), &surface)?;

            samples.push(Sample {
                id,
                label: label.to_string(),
                user_name: record.username.clone(),
                user_id: record.session.clone(),
            });
            progress.update(id as usize)?;
            id += 1;
        }
    }
    progress.finish()?;

    let samples_path = config.samples_path();
    fs::write(&samples_path, serde_json::to_string(&samples)?)
        .with_context(|| format!("write '{}'", samples_path.display()))?;

    log::info!("Wrote {} samples to {}", samples.len(), config.dataset_dir.display());
    Ok(samples)
}
