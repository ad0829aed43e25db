//! Record Store Layer
//!
//! Each media kind (albums, songs) gets one `RecordStore`: the single owner
//! of that kind's metadata collection. Every mutation updates the in-memory
//! collection and flushes it through the snapshot store before returning;
//! deletes cascade into the blob store.

pub mod album;
pub mod song;

pub use album::Album;
pub use song::Song;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::blob::{BlobLocator, BlobStore};
use crate::error::StoreError;
use crate::persist::SnapshotStore;

/// Metadata fields extracted from an upload request
#[derive(Debug, Clone, Default)]
pub struct NewUpload {
    /// Client-supplied identity; the whole authorization model
    pub uploader: String,
    /// Caption or title, depending on the record kind
    pub display: Option<String>,
    /// Filename as uploaded, when the client sent one
    pub original_filename: Option<String>,
}

/// One uploaded item's metadata
pub trait MediaRecord:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Label used in log lines
    const KIND_LABEL: &'static str;

    /// Synthesize a record for a freshly stored blob
    fn from_upload(
        id: String,
        locator: BlobLocator,
        created_at: DateTime<Utc>,
        meta: &NewUpload,
    ) -> Self;

    fn id(&self) -> &str;
    fn uploader(&self) -> &str;
    fn locator(&self) -> &str;
    fn likes(&self) -> usize;
    fn liked_by(&self) -> &[String];
    fn liked_by_mut(&mut self) -> &mut Vec<String>;
    fn set_likes(&mut self, likes: usize);

    /// Add or remove a like; returns whether anything changed.
    ///
    /// Keeps the like count equal to the size of the liked-by set.
    fn apply_like(&mut self, user: &str, want_liked: bool) -> bool {
        let liked = self.liked_by().iter().any(|u| u == user);
        if want_liked == liked {
            return false;
        }
        if want_liked {
            self.liked_by_mut().push(user.to_string());
        } else {
            self.liked_by_mut().retain(|u| u != user);
        }
        let count = self.liked_by().len();
        self.set_likes(count);
        true
    }
}

/// Owner of one media kind's metadata collection
pub struct RecordStore<R: MediaRecord> {
    records: Mutex<Vec<R>>,
    blobs: Arc<dyn BlobStore>,
    snapshots: Arc<dyn SnapshotStore<R>>,
}

impl<R: MediaRecord> RecordStore<R> {
    /// Build the store, restoring the collection from its snapshot
    pub fn new(blobs: Arc<dyn BlobStore>, snapshots: Arc<dyn SnapshotStore<R>>) -> Self {
        let records = snapshots.load();
        info!("Loaded {} {} record(s)", records.len(), R::KIND_LABEL);
        Self {
            records: Mutex::new(records),
            blobs,
            snapshots,
        }
    }

    /// Records in insertion order; never fails, never touches the blob store
    pub fn list(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    /// Locators of every blob a record currently references
    pub fn locators(&self) -> Vec<BlobLocator> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.locator().to_string())
            .collect()
    }

    /// Store the payload, append a fresh record for it, and flush
    pub fn create(
        &self,
        payload: &[u8],
        content_type: &str,
        meta: NewUpload,
    ) -> Result<R, StoreError> {
        if payload.is_empty() {
            return Err(StoreError::NoPayload);
        }

        // Blob first: a write failure here aborts with no metadata appended
        let locator = self
            .blobs
            .store(payload, content_type, meta.original_filename.as_deref())?;

        let record = R::from_upload(Uuid::new_v4().to_string(), locator, Utc::now(), &meta);

        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        self.flush(&records);
        info!(
            "Created {} {} by {}",
            R::KIND_LABEL,
            record.id(),
            record.uploader()
        );
        Ok(record)
    }

    /// Add or remove a like for a user; idempotent on repeated calls
    pub fn set_like(&self, id: &str, user: &str, want_liked: bool) -> Result<R, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let changed = record.apply_like(user, want_liked);
        let updated = record.clone();
        if changed {
            self.flush(&records);
        }
        Ok(updated)
    }

    /// Remove a record and its blob; only the uploader may do this.
    ///
    /// The metadata removal is persisted before the blob is unlinked, so a
    /// crash in between leaves an orphan blob (reclaimable) rather than a
    /// record pointing at nothing.
    pub fn delete(&self, id: &str, requesting_user: &str) -> Result<(), StoreError> {
        let removed = {
            let mut records = self.records.lock().unwrap();
            let pos = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            if records[pos].uploader() != requesting_user {
                return Err(StoreError::Forbidden {
                    id: id.to_string(),
                    user: requesting_user.to_string(),
                });
            }

            let removed = records.remove(pos);
            self.flush(&records);
            removed
        };

        if let Err(e) = self.blobs.delete(removed.locator()) {
            warn!(
                "{} {} deleted but blob {} was not removed, leaving orphan for sweep: {}",
                R::KIND_LABEL,
                id,
                removed.locator(),
                e
            );
        }
        info!("Deleted {} {} for {}", R::KIND_LABEL, id, requesting_user);
        Ok(())
    }

    /// Flush the collection to its snapshot.
    ///
    /// A failed write is logged and swallowed: the live state stays ahead of
    /// disk and the next successful flush reconciles. Availability wins over
    /// per-write durability here.
    fn flush(&self, records: &[R]) {
        if let Err(e) = self.snapshots.save(records) {
            warn!(
                "{} snapshot write failed, in-memory state is ahead of disk: {}",
                R::KIND_LABEL,
                e
            );
        }
    }
}
