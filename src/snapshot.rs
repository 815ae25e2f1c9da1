//! Durable catalog snapshot for fast cold start
//!
//! Persists the flat `(name, full_path)` list so a fresh process can answer
//! queries immediately while the first real walk runs. The hidden flag and
//! scan timestamp are rebuilt by that walk, so they are not stored. A load
//! that fails for any reason (missing, corrupt, unreadable) yields an empty
//! list and never blocks startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::FileSystemItem;

/// On-disk snapshot record.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    name: String,
    path: PathBuf,
}

/// Reads and writes the catalog snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform-default snapshot location under the local data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("dirhop")
            .join("catalog.bin")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the item list.
    ///
    /// Writes to a sibling temp file first and renames it into place, so an
    /// interrupted save leaves any previous snapshot intact.
    pub fn save(&self, items: &[FileSystemItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
        }

        let entries: Vec<SnapshotEntry> = items
            .iter()
            .map(|item| SnapshotEntry {
                name: item.name.clone(),
                path: item.full_path.clone(),
            })
            .collect();

        let bytes = bincode::serialize(&entries).context("Failed to serialize snapshot")?;

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, &bytes)
            .with_context(|| format!("Failed to write snapshot to {:?}", staging))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to move snapshot into place at {:?}", self.path))?;

        log::debug!("Saved {} folders to snapshot {:?}", entries.len(), self.path);
        Ok(())
    }

    /// Load the persisted item list.
    ///
    /// Loaded items carry `is_hidden = false` until the next walk refreshes
    /// them. Returns an empty list on any failure.
    pub fn load(&self) -> Vec<FileSystemItem> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No snapshot at {:?}", self.path);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Failed to read snapshot {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        let entries: Vec<SnapshotEntry> = match bincode::deserialize(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Discarding corrupt snapshot {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .map(|entry| FileSystemItem::new(entry.name, entry.path, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_preserves_names_and_paths() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("catalog.bin"));

        let items = vec![
            FileSystemItem::new("My Documents", "/home/u/My Documents", false),
            FileSystemItem::new("Música", "/home/u/Música", false),
            FileSystemItem::new("プロジェクト", "/srv/プロジェクト", true),
        ];

        store.save(&items).unwrap();
        let loaded = store.load();

        assert_eq!(loaded.len(), items.len());
        for (loaded, original) in loaded.iter().zip(&items) {
            assert_eq!(loaded.name, original.name);
            assert_eq!(loaded.full_path, original.full_path);
        }
        // The hidden flag is rebuilt on the next walk, not round-tripped
        assert!(loaded.iter().all(|item| !item.is_hidden));
    }

    #[test]
    fn test_missing_snapshot_loads_empty() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("never-written.bin"));

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.bin");
        fs::write(&path, b"not a snapshot").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("nested/dir/catalog.bin"));

        store
            .save(&[FileSystemItem::new("a", "/a", false)])
            .unwrap();

        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("catalog.bin"));

        store
            .save(&[FileSystemItem::new("old", "/old", false)])
            .unwrap();
        store
            .save(&[
                FileSystemItem::new("new1", "/new1", false),
                FileSystemItem::new("new2", "/new2", false),
            ])
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "new1");
    }
}
