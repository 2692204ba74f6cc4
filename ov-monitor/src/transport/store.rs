//! Durable backing store for the stop directory.
//!
//! The host environment provides a restart-surviving key/value store; this
//! module models it as the `DirectoryStore` trait and ships a disk-based
//! JSON implementation. The snapshot and its fetch instant are bundled in
//! one document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::StopArea;

/// Error from a directory store operation.
#[derive(Debug, thiserror::Error)]
#[error("directory store error: {message}")]
pub struct StoreError {
    pub message: String,
}

/// A persisted directory snapshot with its fetch instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDirectory {
    /// When the snapshot was fetched from the network (epoch ms).
    pub fetched_at_ms: i64,

    /// The full stop-area collection at that instant.
    pub stops: Vec<StopArea>,
}

/// Restart-surviving backing store for the stop directory.
///
/// Freshness decisions stay with the caller; the store only persists the
/// snapshot and its fetch instant.
pub trait DirectoryStore: Send + Sync {
    /// Load the persisted snapshot, if any. Corrupt or unreadable data
    /// reads as absent.
    fn load(&self) -> Option<StoredDirectory>;

    /// Persist a snapshot, replacing any previous one.
    fn save(&self, snapshot: &StoredDirectory) -> Result<(), StoreError>;
}

/// Disk-based JSON implementation of [`DirectoryStore`].
#[derive(Debug, Clone)]
pub struct DiskDirectoryStore {
    path: PathBuf,
}

impl DiskDirectoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryStore for DiskDirectoryStore {
    fn load(&self) -> Option<StoredDirectory> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn save(&self, snapshot: &StoredDirectory) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError {
                message: format!("failed to create store directory: {}", e),
            })?;
        }

        let json = serde_json::to_string(snapshot).map_err(|e| StoreError {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| StoreError {
            message: format!("failed to write store file: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopCode;
    use tempfile::tempdir;

    fn snapshot() -> StoredDirectory {
        StoredDirectory {
            fetched_at_ms: 1_749_900_660_000,
            stops: vec![StopArea {
                code: StopCode::parse("asdcs").unwrap(),
                name: "Amsterdam Centraal".to_string(),
                town: "Amsterdam".to_string(),
            }],
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = DiskDirectoryStore::new(dir.path().join("directory.json"));

        store.save(&snapshot()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.fetched_at_ms, 1_749_900_660_000);
        assert_eq!(loaded.stops.len(), 1);
        assert_eq!(loaded.stops[0].name, "Amsterdam Centraal");
    }

    #[test]
    fn missing_file_reads_absent() {
        let store = DiskDirectoryStore::new("/nonexistent/path/directory.json");
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_reads_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, "not json").unwrap();

        let store = DiskDirectoryStore::new(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("directory.json");
        let store = DiskDirectoryStore::new(&path);

        store.save(&snapshot()).unwrap();
        assert!(path.exists());
    }
}
