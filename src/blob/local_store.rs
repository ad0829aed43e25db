//! Local directory blob storage implementation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use uuid::Uuid;

use crate::blob::{parse_locator, BlobLocator, BlobStore, MediaKind};
use crate::error::StoreError;

const KINDS: [MediaKind; 2] = [MediaKind::Image, MediaKind::Audio];

/// Blob store writing uploads under a local root, partitioned by media kind
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create the store, making sure every kind directory exists up front
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        for kind in KINDS {
            fs::create_dir_all(root.join(kind.dir_name()))?;
        }
        info!("Using upload directory: {}", root.display());
        Ok(Self { root })
    }

    fn blob_path(&self, kind: MediaKind, name: &str) -> PathBuf {
        self.root.join(kind.dir_name()).join(name)
    }

    /// Generate a filename that does not collide with anything already stored
    fn fresh_name(&self, kind: MediaKind, extension: &str) -> (String, PathBuf) {
        loop {
            let name = format!("{}{}", Uuid::new_v4(), extension);
            let path = self.blob_path(kind, &name);
            if !path.exists() {
                return (name, path);
            }
        }
    }
}

/// Pick the stored file's extension: the original filename's if it looks
/// sane, otherwise one registered for the declared content type.
fn extension_for(original_name: Option<&str>, content_type: &str) -> String {
    if let Some(name) = original_name {
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return format!(".{}", ext.to_ascii_lowercase());
            }
        }
    }
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

impl BlobStore for LocalBlobStore {
    fn store(
        &self,
        data: &[u8],
        content_type: &str,
        original_name: Option<&str>,
    ) -> Result<BlobLocator, StoreError> {
        let kind = MediaKind::from_content_type(content_type)
            .ok_or_else(|| StoreError::UnsupportedMediaKind(content_type.to_string()))?;

        let extension = extension_for(original_name, content_type);
        let (name, path) = self.fresh_name(kind, &extension);

        fs::write(&path, data).map_err(StoreError::BlobWrite)?;
        info!(
            "Stored {} byte {} blob as {}",
            data.len(),
            kind.dir_name(),
            name
        );

        Ok(format!("/uploads/{}/{}", kind.dir_name(), name))
    }

    fn read(&self, locator: &str) -> Result<Vec<u8>, StoreError> {
        let (kind, name) =
            parse_locator(locator).ok_or_else(|| StoreError::NotFound(locator.to_string()))?;
        match fs::read(self.blob_path(kind, name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(locator.to_string()))
            }
            Err(e) => Err(StoreError::BlobWrite(e)),
        }
    }

    fn delete(&self, locator: &str) -> Result<(), StoreError> {
        let Some((kind, name)) = parse_locator(locator) else {
            warn!("Ignoring delete for unresolvable locator: {}", locator);
            return Ok(());
        };
        match fs::remove_file(self.blob_path(kind, name)) {
            Ok(()) => {
                info!("Deleted blob {}", locator);
                Ok(())
            }
            // Already gone: the cascade has happened or storage drifted
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::BlobWrite(e)),
        }
    }

    fn list_older_than(&self, min_age: Duration) -> Result<Vec<BlobLocator>, StoreError> {
        let mut locators = Vec::new();
        for kind in KINDS {
            let dir = self.root.join(kind.dir_name());
            for entry in fs::read_dir(&dir).map_err(StoreError::BlobWrite)? {
                let entry = entry.map_err(StoreError::BlobWrite)?;
                let meta = entry.metadata().map_err(StoreError::BlobWrite)?;
                if !meta.is_file() {
                    continue;
                }
                let old_enough = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.elapsed().ok())
                    .map(|age| age >= min_age)
                    .unwrap_or(false);
                if !old_enough {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    locators.push(format!("/uploads/{}/{}", kind.dir_name(), name));
                }
            }
        }
        Ok(locators)
    }
}
