//! Image export for session records.

use anyhow::Context as _;
use sketchset_core::raster::Rasterizer;
use sketchset_core::session::SessionRecord;
use sketchset_core::wizard::CaptureWizard;
use sketchset_render::write_png;
use std::fs;
use std::path::{Path, PathBuf};

/// Render every non-empty drawing of `record` into `out_dir` as
/// `{session}_{username}_{label}.png`.
pub fn export_session_images<R: Rasterizer + ?Sized>(
    record: &SessionRecord,
    rasterizer: &mut R,
    size: u32,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;

    let mut written = Vec::new();
    for (label, paths) in record.drawings.iter() {
        if paths.is_empty() {
            log::debug!("Skipping empty drawing for {}", label);
            continue;
        }
        let surface = rasterizer
            .render(paths, size, size)
            .with_context(|| format!("render drawing '{}'", label))?;
        let path = out_dir.join(record.image_file_name(label));
        write_png(&path, &surface)?;
        written.push(path);
    }

    log::info!(
        "Exported {} images for session {}",
        written.len(),
        record.session
    );
    Ok(written)
}

/// Render the board of the label being drawn into `out_dir`.
///
/// Returns `None` when there is no current label or nothing is drawn.
pub fn export_current_image<R: Rasterizer + ?Sized>(
    wizard: &CaptureWizard,
    rasterizer: &mut R,
    out_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(file_name) = wizard.image_file_name() else {
        return Ok(None);
    };
    if !wizard.board().can_export_image() {
        return Ok(None);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;
    let surface = wizard.board().render(rasterizer)?;
    let path = out_dir.join(file_name);
    write_png(&path, &surface)?;
    Ok(Some(path))
}
