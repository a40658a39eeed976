//! File-based storage implementation.

use super::{BoxFuture, SessionStore, StorageError, StorageResult};
use crate::session::SessionRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each session record as `{session}.json` in a directory.
pub struct FileStorage {
    /// Base directory for record storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Open storage in `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| io_error("create", &base_path, e))?;
        Ok(Self { base_path })
    }

    /// Storage under the platform data directory, e.g.
    /// `~/.local/share/sketchset/sessions/` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("sketchset").join("sessions"))
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", sanitize_id(id)))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Replace anything that could escape the storage directory.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

impl SessionStore for FileStorage {
    fn save(&self, record: &SessionRecord) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.record_path(record.session.as_str());
        let json = record
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()));

        Box::pin(async move {
            let json = json?;
            // Write then rename so a crash never leaves a truncated record.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json).map_err(|e| io_error("write", &tmp, e))?;
            fs::rename(&tmp, &path).map_err(|e| io_error("rename", &path, e))?;
            log::info!("Saved session record to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionRecord>> {
        let path = self.record_path(id);
        let id = id.to_string();

        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(StorageError::NotFound(id));
                }
                Err(e) => return Err(io_error("read", &path, e)),
            };
            SessionRecord::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("{}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.record_path(id);

        Box::pin(async move {
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("Deleted {}", path.display());
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error("delete", &path, e)),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = match fs::read_dir(&self.base_path) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(io_error("list", &self.base_path, e)),
            };

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.record_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
}
