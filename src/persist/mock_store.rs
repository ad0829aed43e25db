//! Mock implementation of SnapshotStore for testing

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::PersistError;
use crate::persist::SnapshotStore;

/// In-memory snapshot store with a switchable save-failure mode
pub struct MockSnapshotStore<R> {
    records: Mutex<Vec<R>>,
    fail_saves: AtomicBool,
}

impl<R> MockSnapshotStore<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail, to exercise the caller's
    /// availability-over-durability policy
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of records in the last successful save
    pub fn saved_len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl<R> Default for MockSnapshotStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SnapshotStore<R> for MockSnapshotStore<R>
where
    R: Clone + Send,
{
    fn load(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    fn save(&self, records: &[R]) -> Result<(), PersistError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected save failure",
            )));
        }
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_snapshot_round_trip() {
        let store = MockSnapshotStore::new();
        assert!(store.load().is_empty());

        store.save(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(store.saved_len(), 2);
        assert_eq!(store.load(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_injected_save_failure() {
        let store = MockSnapshotStore::new();
        store.set_fail_saves(true);
        assert!(store.save(&["a".to_string()]).is_err());
        assert_eq!(store.saved_len(), 0);

        store.set_fail_saves(false);
        store.save(&["a".to_string()]).unwrap();
        assert_eq!(store.saved_len(), 1);
    }
}
