//! Single-file store for the last successfully fetched snapshot.
//!
//! Writers replace the file atomically: the new snapshot is written and
//! synced to a sibling temp file, then renamed over the target. A reader
//! doing a whole-file read therefore sees either the previous or the new
//! snapshot in full, never a mix, and needs no lock.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::FeatureCollection;
use crate::error::CacheError;

/// Handle to the cache artifact.
///
/// Cheap to clone; holds only the path. Exactly one writer (the sync
/// scheduler) is expected, readers are unbounded.
#[derive(Debug, Clone)]
pub struct EventCache {
    path: PathBuf,
}

impl EventCache {
    /// Creates a handle for the cache file at `path`. Nothing is touched on
    /// disk until the first [`write`](Self::write).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replaces the cache content with `snapshot`.
    ///
    /// Creates the parent directory if needed. On failure the previous
    /// content is left in place.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory, temp file, or rename
    /// fails.
    pub async fn write(&self, snapshot: &[u8]) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| io_err(dir, e))?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, snapshot).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_err(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_err(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), bytes = snapshot.len(), "cache replaced");
        Ok(())
    }

    /// Reads and parses the current snapshot.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Unavailable`] if no snapshot was ever written.
    /// - [`CacheError::Corrupt`] if the content is not a feature collection.
    /// - [`CacheError::Io`] on any other read failure.
    pub async fn read(&self) -> Result<FeatureCollection, CacheError> {
        let bytes = self.read_bytes().await?;
        FeatureCollection::from_slice(&bytes).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Reads the raw snapshot bytes without parsing.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read), minus [`CacheError::Corrupt`].
    pub async fn read_bytes(&self) -> Result<Vec<u8>, CacheError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CacheError::Unavailable(self.path.clone()))
            }
            Err(e) => Err(io_err(&self.path, e)),
        }
    }

    /// Modification time of the current snapshot, i.e. when the last
    /// successful refresh landed. `None` if no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file exists but its metadata
    /// cannot be read.
    pub async fn modified_at(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| io_err(&self.path, e))?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&self.path, e)),
        }
    }

    /// Sibling temp path, so the final rename never crosses filesystems.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "cache".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

fn io_err(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn snapshot(place: &str, count: usize) -> Vec<u8> {
        let features: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "geometry": { "coordinates": [1.0, 2.0, 3.0] },
                    "properties": { "mag": 5.0, "time": i, "place": place }
                })
            })
            .collect();
        serde_json::to_vec(&serde_json::json!({ "type": "FeatureCollection", "features": features }))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn read_before_first_write_is_unavailable() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let cache = EventCache::new(dir.path().join("events.geojson"));
        assert!(matches!(cache.read().await, Err(CacheError::Unavailable(_))));
        assert!(matches!(cache.modified_at().await, Ok(None)));
    }

    #[tokio::test]
    async fn write_creates_missing_directories_and_round_trips() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let cache = EventCache::new(dir.path().join("static/data/events.geojson"));
        let body = snapshot("a", 3);

        assert!(cache.write(&body).await.is_ok());

        let Ok(collection) = cache.read().await else {
            panic!("read after write failed");
        };
        assert_eq!(collection.len(), 3);
        assert!(matches!(cache.read_bytes().await, Ok(bytes) if bytes == body));
        assert!(matches!(cache.modified_at().await, Ok(Some(_))));
        assert!(!cache.temp_path().exists());
    }

    #[tokio::test]
    async fn write_overwrites_instead_of_appending() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let cache = EventCache::new(dir.path().join("events.geojson"));
        assert!(cache.write(&snapshot("old", 5)).await.is_ok());
        let newer = snapshot("new", 1);
        assert!(cache.write(&newer).await.is_ok());
        assert!(matches!(cache.read_bytes().await, Ok(bytes) if bytes == newer));
    }

    #[tokio::test]
    async fn garbage_content_is_corrupt() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let cache = EventCache::new(dir.path().join("events.geojson"));
        assert!(cache.write(b"{\"features\": [").await.is_ok());
        assert!(matches!(cache.read().await, Err(CacheError::Corrupt { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reader_never_sees_partial_snapshot() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let cache = EventCache::new(dir.path().join("events.geojson"));
        let small = snapshot("small", 1);
        let large = snapshot("large", 2_000);
        assert!(cache.write(&small).await.is_ok());

        let done = Arc::new(AtomicBool::new(false));
        let mut readers = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let done = Arc::clone(&done);
            let (small, large) = (small.clone(), large.clone());
            readers.push(tokio::spawn(async move {
                while !done.load(Ordering::Acquire) {
                    let Ok(bytes) = cache.read_bytes().await else {
                        panic!("reader saw a missing cache");
                    };
                    assert!(bytes == small || bytes == large, "partial snapshot observed");
                }
            }));
        }

        for i in 0..50 {
            let body = if i % 2 == 0 { &large } else { &small };
            assert!(cache.write(body).await.is_ok());
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.await.is_ok(), "reader task failed");
        }
    }
}
