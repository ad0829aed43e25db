//! Background sweeper for orphan blobs
//!
//! A delete persists the metadata removal before unlinking the blob, so a
//! crash (or a failed unlink) can leave a blob no record references. This
//! worker runs periodically and reclaims them. Blobs younger than the
//! configured minimum age are skipped so an upload whose record append is
//! still in flight is never swept.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::time;

use crate::blob::BlobStore;
use crate::config::SweepConfig;
use crate::error::StoreError;
use crate::record::{Album, RecordStore, Song};

/// Background orphan blob sweeper
pub struct OrphanSweeper {
    blobs: Arc<dyn BlobStore>,
    albums: Arc<RecordStore<Album>>,
    songs: Arc<RecordStore<Song>>,
    interval: Duration,
    min_age: Duration,
}

impl OrphanSweeper {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        albums: Arc<RecordStore<Album>>,
        songs: Arc<RecordStore<Song>>,
        config: &SweepConfig,
    ) -> Self {
        Self {
            blobs,
            albums,
            songs,
            interval: Duration::from_secs(config.interval_secs),
            min_age: Duration::from_secs(config.min_age_secs),
        }
    }

    /// Start the sweeper as a background task (non-blocking)
    pub fn start_background(self) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting orphan sweeper with {}s interval, {}s age floor",
            self.interval.as_secs(),
            self.min_age.as_secs()
        );

        tokio::spawn(async move {
            let mut interval = time::interval(self.interval);
            loop {
                interval.tick().await;
                match self.sweep_once() {
                    Ok(0) => {}
                    Ok(removed) => info!("Swept {} orphan blob(s)", removed),
                    Err(e) => error!("Sweep pass failed: {}", e),
                }
            }
        })
    }

    /// One sweep pass: delete every old-enough blob no record references
    pub fn sweep_once(&self) -> Result<usize, StoreError> {
        let mut live: HashSet<String> = self.albums.locators().into_iter().collect();
        live.extend(self.songs.locators());

        let mut removed = 0;
        for locator in self.blobs.list_older_than(self.min_age)? {
            if live.contains(&locator) {
                continue;
            }
            match self.blobs.delete(&locator) {
                Ok(()) => removed += 1,
                Err(e) => error!("Failed to remove orphan blob {}: {}", locator, e),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::mock_store::MockBlobStore;
    use crate::persist::mock_store::MockSnapshotStore;
    use crate::record::NewUpload;

    fn sweeper() -> (Arc<MockBlobStore>, OrphanSweeper) {
        let blobs = Arc::new(MockBlobStore::new());
        let album_snapshots: Arc<MockSnapshotStore<Album>> = Arc::new(MockSnapshotStore::new());
        let song_snapshots: Arc<MockSnapshotStore<Song>> = Arc::new(MockSnapshotStore::new());
        let albums = Arc::new(RecordStore::new(blobs.clone(), album_snapshots));
        let songs = Arc::new(RecordStore::new(blobs.clone(), song_snapshots));
        let config = SweepConfig {
            enabled: true,
            interval_secs: 300,
            min_age_secs: 0,
        };
        let sweeper = OrphanSweeper::new(blobs.clone(), albums, songs, &config);
        (blobs, sweeper)
    }

    #[test]
    fn test_sweep_removes_only_orphans() {
        let (blobs, sweeper) = sweeper();

        let album = sweeper
            .albums
            .create(
                b"jpeg",
                "image/jpeg",
                NewUpload {
                    uploader: "alice".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let song = sweeper
            .songs
            .create(
                b"mp3",
                "audio/mpeg",
                NewUpload {
                    uploader: "bob".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        // A blob nothing references
        blobs.insert_raw("/uploads/images/orphan", b"stale");

        assert_eq!(sweeper.sweep_once().unwrap(), 1);
        assert!(!blobs.contains("/uploads/images/orphan"));
        assert!(blobs.contains(&album.src));
        assert!(blobs.contains(&song.src));
    }

    #[test]
    fn test_sweep_with_nothing_to_do() {
        let (_blobs, sweeper) = sweeper();
        assert_eq!(sweeper.sweep_once().unwrap(), 0);
    }
}
