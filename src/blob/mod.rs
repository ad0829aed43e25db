//! Blob Storage Layer Abstraction
//!
//! This module provides an abstraction over blob storage backends, so the
//! record stores can persist uploaded bytes without knowing whether they land
//! on a local disk or in an in-memory mock.

pub mod local_store;
pub mod mock_store;

use std::time::Duration;

use crate::error::StoreError;

/// Opaque, stable reference from a metadata record to its blob
pub type BlobLocator = String;

/// The two media kinds this service stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Derive the kind from a declared content type, by MIME prefix
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// Derive the kind from a locator's directory segment
    pub fn from_dir(dir: &str) -> Option<Self> {
        match dir {
            "images" => Some(MediaKind::Image),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }

    /// Directory name the kind's blobs live under
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Audio => "audio",
        }
    }
}

/// Split a locator into its kind and generated filename.
///
/// Only locators of the exact shape `/uploads/<kind-dir>/<filename>` resolve,
/// where the filename is a single path component. Anything else is treated as
/// unresolvable rather than mapped onto the filesystem.
pub fn parse_locator(locator: &str) -> Option<(MediaKind, &str)> {
    let rest = locator.strip_prefix("/uploads/")?;
    let (dir, name) = rest.split_once('/')?;
    let kind = MediaKind::from_dir(dir)?;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some((kind, name))
}

/// Trait defining the blob storage interface
pub trait BlobStore: Send + Sync {
    /// Persist uploaded bytes under a freshly generated name and return the locator
    fn store(
        &self,
        data: &[u8],
        content_type: &str,
        original_name: Option<&str>,
    ) -> Result<BlobLocator, StoreError>;

    /// Read back the bytes a locator points at
    fn read(&self, locator: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove the blob a locator points at; a missing blob is not an error
    fn delete(&self, locator: &str) -> Result<(), StoreError>;

    /// List locators of blobs written at least `min_age` ago
    fn list_older_than(&self, min_age: Duration) -> Result<Vec<BlobLocator>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(
            MediaKind::from_content_type("image/jpeg"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_content_type("audio/mpeg"),
            Some(MediaKind::Audio)
        );
        assert_eq!(MediaKind::from_content_type("text/plain"), None);
        assert_eq!(MediaKind::from_content_type(""), None);
    }

    #[test]
    fn test_parse_locator_accepts_generated_shapes() {
        let (kind, name) = parse_locator("/uploads/images/abc-123.jpg").unwrap();
        assert_eq!(kind, MediaKind::Image);
        assert_eq!(name, "abc-123.jpg");

        let (kind, name) = parse_locator("/uploads/audio/track.mp3").unwrap();
        assert_eq!(kind, MediaKind::Audio);
        assert_eq!(name, "track.mp3");
    }

    #[test]
    fn test_parse_locator_rejects_escapes() {
        assert!(parse_locator("/uploads/images/../secrets").is_none());
        assert!(parse_locator("/uploads/images/a/b").is_none());
        assert!(parse_locator("/uploads/video/a.mp4").is_none());
        assert!(parse_locator("/uploads/images/").is_none());
        assert!(parse_locator("/elsewhere/images/a.jpg").is_none());
    }
}
