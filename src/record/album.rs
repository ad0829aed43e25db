//! Album record: one uploaded photo ("memory")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob::BlobLocator;
use crate::record::{MediaRecord, NewUpload};

const DEFAULT_CAPTION: &str = "New Memory";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    /// Locator of the stored image
    pub src: BlobLocator,
    pub caption: String,
    pub uploader: String,
    pub created_at: DateTime<Utc>,
    pub likes: usize,
    pub liked_by: Vec<String>,
}

impl MediaRecord for Album {
    const KIND_LABEL: &'static str = "album";

    fn from_upload(
        id: String,
        locator: BlobLocator,
        created_at: DateTime<Utc>,
        meta: &NewUpload,
    ) -> Self {
        let caption = meta
            .display
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CAPTION)
            .to_string();
        Self {
            id,
            src: locator,
            caption,
            uploader: meta.uploader.clone(),
            created_at,
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
