//! JSON snapshot persistence implementation

use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistError;
use crate::persist::SnapshotStore;

/// Whole-file JSON snapshot of one record collection
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<R> SnapshotStore<R> for JsonSnapshotStore
where
    R: Serialize + DeserializeOwned,
{
    fn load(&self) -> Vec<R> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No snapshot at {}, starting with an empty collection",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Unreadable snapshot at {}: {}, starting with an empty collection",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Corrupt snapshot at {}: {}, starting with an empty collection",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[R]) -> Result<(), PersistError> {
        let encoded = serde_json::to_vec_pretty(records)?;
        // Stage into a sibling temp file so a crash mid-write cannot
        // truncate the previous snapshot
        let temp = self.temp_path();
        fs::write(&temp, encoded)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Demo {
        id: String,
        likes: usize,
    }

    fn demo(id: &str, likes: usize) -> Demo {
        Demo {
            id: id.to_string(),
            likes,
        }
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("albums.json"));
        let records: Vec<Demo> = store.load();
        assert!(records.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("albums.json"));

        let records = vec![demo("a", 0), demo("b", 2)];
        store.save(&records).unwrap();
        let loaded: Vec<Demo> = store.load();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("songs.json"));

        store.save(&vec![demo("a", 0), demo("b", 0)]).unwrap();
        store.save(&vec![demo("b", 1)]).unwrap();
        let loaded: Vec<Demo> = store.load();
        assert_eq!(loaded, vec![demo("b", 1)]);
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("albums.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonSnapshotStore::new(&path);
        let records: Vec<Demo> = store.load();
        assert!(records.is_empty());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("albums.json"));
        store.save(&vec![demo("a", 0)]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec!["albums.json"]);
    }
}
