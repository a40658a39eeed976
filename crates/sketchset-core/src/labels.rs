//! Label sources for the capture wizard.
//!
//! Label retrieval is the only asynchronous step of a session: the wizard is
//! built once the provider resolves.

use crate::storage::BoxFuture;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Labels used when no other source is configured.
pub const DEFAULT_LABELS: [&str; 8] = [
    "car", "fish", "house", "tree", "bicycle", "guitar", "pencil", "clock",
];

/// Label retrieval errors.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Failed to fetch labels: {0}")]
    Fetch(String),
    #[error("Failed to parse labels: {0}")]
    Parse(String),
}

/// Result type for label retrieval.
pub type LabelResult<T> = Result<T, LabelError>;

/// Trait for label sources.
///
/// A fetch resolves once with the ordered labels for a session.
pub trait LabelProvider: Send + Sync {
    fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>>;
}

impl<P: LabelProvider + ?Sized> LabelProvider for Box<P> {
    fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>> {
        (**self).fetch_labels()
    }
}

/// A fixed, in-memory label list.
#[derive(Debug, Clone)]
pub struct StaticLabels {
    labels: Vec<String>,
}

impl StaticLabels {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for StaticLabels {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl LabelProvider for StaticLabels {
    fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>> {
        let labels = self.labels.clone();
        Box::pin(async move { Ok(labels) })
    }
}

/// Labels read from a JSON array of strings on disk.
#[derive(Debug, Clone)]
pub struct FileLabels {
    path: PathBuf,
}

impl FileLabels {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LabelProvider for FileLabels {
    fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>> {
        let path = self.path.clone();
        Box::pin(async move {
            let json = fs::read_to_string(&path).map_err(|e| {
                LabelError::Fetch(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                LabelError::Parse(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }
}

/// Remembers the first successful fetch of the wrapped provider.
///
/// Failures are not cached; the next fetch asks the provider again.
pub struct CachedLabels<P> {
    inner: P,
    cache: OnceLock<Vec<String>>,
}

impl<P: LabelProvider> CachedLabels<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: OnceLock::new(),
        }
    }

    /// Check if a successful fetch has been cached.
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl<P: LabelProvider> LabelProvider for CachedLabels<P> {
    fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>> {
        Box::pin(async move {
            if let Some(labels) = self.cache.get() {
                log::debug!("Using {} cached labels", labels.len());
                return Ok(labels.clone());
            }
            let labels = self.inner.fetch_labels().await?;
            Ok(self.cache.get_or_init(|| labels).clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Fails the first `failures` fetches, then succeeds.
    struct FlakyLabels {
        calls: AtomicUsize,
        failures: usize,
    }

    impl LabelProvider for FlakyLabels {
        fn fetch_labels(&self) -> BoxFuture<'_, LabelResult<Vec<String>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = call < self.failures;
            Box::pin(async move {
                if fail {
                    Err(LabelError::Fetch("offline".to_string()))
                } else {
                    Ok(vec!["car".to_string(), "fish".to_string()])
                }
            })
        }
    }

    #[test]
    fn test_static_defaults() {
        let labels = block_on(StaticLabels::default().fetch_labels()).unwrap();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "car");
        assert_eq!(labels[7], "clock");
    }

    #[test]
    fn test_file_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, r#"["sun", "moon"]"#).unwrap();

        let labels = block_on(FileLabels::new(&path).fetch_labels()).unwrap();
        assert_eq!(labels, vec!["sun", "moon"]);
    }

    #[test]
    fn test_file_labels_errors() {
        let dir = tempdir().unwrap();
        let missing = FileLabels::new(dir.path().join("missing.json"));
        assert!(matches!(
            block_on(missing.fetch_labels()),
            Err(LabelError::Fetch(_))
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            block_on(FileLabels::new(&path).fetch_labels()),
            Err(LabelError::Parse(_))
        ));
    }

    #[test]
    fn test_cache_skips_second_fetch() {
        let provider = CachedLabels::new(FlakyLabels {
            calls: AtomicUsize::new(0),
            failures: 0,
        });

        assert!(!provider.is_cached());
        block_on(provider.fetch_labels()).unwrap();
        block_on(provider.fetch_labels()).unwrap();

        assert!(provider.is_cached());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let provider = CachedLabels::new(FlakyLabels {
            calls: AtomicUsize::new(0),
            failures: 1,
        });

        assert!(block_on(provider.fetch_labels()).is_err());
        assert!(!provider.is_cached());

        let labels = block_on(provider.fetch_labels()).unwrap();
        assert_eq!(labels, vec!["car", "fish"]);
        assert!(provider.is_cached());
    }
}
