//! Error taxonomy shared by the blob, record and persistence layers

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure to read or write a durable snapshot
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist (or no longer exists)
    #[error("no record with id {0}")]
    NotFound(String),

    /// The requesting user is not the uploader of the record
    #[error("user {user} is not the uploader of record {id}")]
    Forbidden { id: String, user: String },

    /// An upload arrived without any payload bytes
    #[error("upload contained no data")]
    NoPayload,

    /// The declared content type is neither an image nor audio
    #[error("unsupported media type: {0}")]
    UnsupportedMediaKind(String),

    /// A durable snapshot write failed; the in-memory state is ahead of disk
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistError),

    /// Reading or writing blob bytes on disk failed
    #[error("blob storage i/o failed: {0}")]
    BlobWrite(#[source] std::io::Error),
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
            StoreError::NoPayload => StatusCode::BAD_REQUEST,
            StoreError::UnsupportedMediaKind(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            StoreError::Persistence(_) | StoreError::BlobWrite(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
