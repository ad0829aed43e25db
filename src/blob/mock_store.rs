//! Mock implementation of BlobStore for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use log::info;

use crate::blob::{BlobLocator, BlobStore, MediaKind};
use crate::error::StoreError;

/// In-memory blob store keyed by locator
pub struct MockBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    next_name: AtomicU64,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            next_name: AtomicU64::new(0),
        }
    }

    /// Number of blobs currently held
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    /// Check whether a locator currently resolves
    pub fn contains(&self, locator: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(locator)
    }

    /// Plant a blob under an arbitrary locator, bypassing `store`
    pub fn insert_raw(&self, locator: &str, data: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(locator.to_string(), data.to_vec());
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MockBlobStore {
    fn store(
        &self,
        data: &[u8],
        content_type: &str,
        _original_name: Option<&str>,
    ) -> Result<BlobLocator, StoreError> {
        let kind = MediaKind::from_content_type(content_type)
            .ok_or_else(|| StoreError::UnsupportedMediaKind(content_type.to_string()))?;

        let n = self.next_name.fetch_add(1, Ordering::Relaxed);
        let locator = format!("/uploads/{}/blob-{}", kind.dir_name(), n);
        self.blobs
            .lock()
            .unwrap()
            .insert(locator.clone(), data.to_vec());

        info!("Mock: stored {} bytes as {}", data.len(), locator);
        Ok(locator)
    }

    fn read(&self, locator: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(locator.to_string()))
    }

    fn delete(&self, locator: &str) -> Result<(), StoreError> {
        // Missing entries are fine: delete is idempotent
        self.blobs.lock().unwrap().remove(locator);
        Ok(())
    }

    fn list_older_than(&self, _min_age: Duration) -> Result<Vec<BlobLocator>, StoreError> {
        // Age is not modeled in memory; every blob is a candidate
        Ok(self.blobs.lock().unwrap().keys().cloned().collect())
    }
}
