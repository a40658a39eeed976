//! Storage abstraction for session records.

mod memory;
mod file;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::session::SessionRecord;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for session record storage backends.
///
/// Records are keyed by their session id.
pub trait SessionStore: Send + Sync {
    /// Save a record under its session id.
    fn save(&self, record: &SessionRecord) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a record.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionRecord>>;

    /// Delete a record.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all session ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a record exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
