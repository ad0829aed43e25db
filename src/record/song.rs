//! Song record: one uploaded audio track

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob::BlobLocator;
use crate::record::{MediaRecord, NewUpload};

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    /// Locator of the stored audio file
    pub src: BlobLocator,
    /// Filename as uploaded, kept for display
    pub file_name: String,
    pub uploader: String,
    pub created_at: DateTime<Utc>,
    /// Computed client-side; persisted verbatim
    pub duration: String,
    pub likes: usize,
    pub liked_by: Vec<String>,
}

/// Title fallback: the uploaded filename without its extension
fn title_from_filename(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

impl MediaRecord for Song {
    const KIND_LABEL: &'static str = "song";

    fn from_upload(
        id: String,
        locator: BlobLocator,
        created_at: DateTime<Utc>,
        meta: &NewUpload,
    ) -> Self {
        let file_name = meta.original_filename.clone().unwrap_or_default();
        let title = meta
            .display
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| title_from_filename(&file_name))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Self {
            id,
            title,
            src: locator,
            file_name,
            uploader: meta.uploader.clone(),
            created_at,
            duration: "Unknown".to_string(),
            likes: 0,
            liked_by: Vec::new(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn uploader(&self) -> &str {
        &self.uploader
    }

    fn locator(&self) -> &str {
        &self.src
    }

    fn likes(&self) -> usize {
        self.likes
    }

    fn liked_by(&self) -> &[String] {
        &self.liked_by
    }

    fn liked_by_mut(&mut self) -> &mut Vec<String> {
        &mut self.liked_by
    }

    fn set_likes(&mut self, likes: usize) {
        self.likes = likes;
    }
}
