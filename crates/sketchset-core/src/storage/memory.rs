//! In-memory storage implementation.

use super::{BoxFuture, SessionStore, StorageError, StorageResult};
use crate::session::SessionRecord;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keeps records in a map for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, SessionRecord>>,
}

type Records = HashMap<String, SessionRecord>;

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Records>> {
        self.records.read().map_err(|e| lock_error(&e))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Records>> {
        self.records.write().map_err(|e| lock_error(&e))
    }
}

fn lock_error(e: &dyn std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl SessionStore for MemoryStorage {
    fn save(&self, record: &SessionRecord) -> BoxFuture<'_, StorageResult<()>> {
        let record = record.clone();
        Box::pin(async move {
            self.write()?.insert(record.session.to_string(), record);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let found = self.read()?.get(&id).cloned();
            found.ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write()?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let mut ids: Vec<String> = self.read()?.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&id)) })
    }
}
