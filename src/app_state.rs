//! Application State Management
//!
//! Builds the record stores and their backends from configuration and shares
//! them with the handlers, following the dependency injection pattern.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::blob::{local_store::LocalBlobStore, mock_store::MockBlobStore, BlobStore};
use crate::config::{AppConfig, BlobBackend, PersistenceBackend};
use crate::persist::{json_store::JsonSnapshotStore, mock_store::MockSnapshotStore, SnapshotStore};
use crate::record::{Album, RecordStore, Song};

/// Application state containing the stores and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub albums: Arc<RecordStore<Album>>,
    pub songs: Arc<RecordStore<Song>>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with services configured from YAML config
    pub fn new() -> Self {
        let config = AppConfig::load().expect("Failed to load configuration");
        Self::from_config(config)
    }

    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Self {
        info!("Initializing application state");

        let blobs: Arc<dyn BlobStore> = match config.blobs.backend {
            BlobBackend::LocalDir => {
                info!(
                    "Using local blob storage under {}",
                    config.blobs.upload_root
                );
                Arc::new(
                    LocalBlobStore::new(&config.blobs.upload_root)
                        .expect("Failed to create upload directories"),
                )
            }
            BlobBackend::Mock => {
                info!("Using mock blob storage");
                Arc::new(MockBlobStore::new())
            }
        };

        let (album_snapshots, song_snapshots): (
            Arc<dyn SnapshotStore<Album>>,
            Arc<dyn SnapshotStore<Song>>,
        ) = match config.persistence.backend {
            PersistenceBackend::Json => {
                let data_dir = Path::new(&config.persistence.data_dir);
                fs::create_dir_all(data_dir).expect("Failed to create data directory");
                info!("Using JSON snapshots under {}", data_dir.display());
                (
                    Arc::new(JsonSnapshotStore::new(data_dir.join("albums.json"))),
                    Arc::new(JsonSnapshotStore::new(data_dir.join("songs.json"))),
                )
            }
            PersistenceBackend::Mock => {
                info!("Using mock snapshot storage");
                (
                    Arc::new(MockSnapshotStore::new()),
                    Arc::new(MockSnapshotStore::new()),
                )
            }
        };

        let albums = Arc::new(RecordStore::new(blobs.clone(), album_snapshots));
        let songs = Arc::new(RecordStore::new(blobs.clone(), song_snapshots));

        info!("Application state initialized");
        Self {
            albums,
            songs,
            blobs,
            config,
        }
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        let config = AppConfig::default();
        let blobs: Arc<dyn BlobStore> = Arc::new(MockBlobStore::new());
        let album_snapshots: Arc<MockSnapshotStore<Album>> = Arc::new(MockSnapshotStore::new());
        let song_snapshots: Arc<MockSnapshotStore<Song>> = Arc::new(MockSnapshotStore::new());
        let albums = Arc::new(RecordStore::new(blobs.clone(), album_snapshots));
        let songs = Arc::new(RecordStore::new(blobs.clone(), song_snapshots));

        Self {
            albums,
            songs,
            blobs,
            config,
        }
    }
}
