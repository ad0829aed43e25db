//! HTTP handlers for the album and song collections
//!
//! Thin transport glue: extract identity, payload bytes and display fields
//! from the request, then delegate to the record stores. The `User` header is
//! the whole identity model; it is tagged into the logging MDC the same way
//! the rest of the request context is logged.

use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{delete, get, post, put, web, Error, HttpRequest, HttpResponse};
use bytes::BytesMut;
use futures::StreamExt;
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::record::{MediaRecord, NewUpload, RecordStore};

/// Extract the requesting user from the `User` header
fn user_header(req: &HttpRequest) -> Result<String, Error> {
    let user = req
        .headers()
        .get("User")
        .ok_or_else(|| ErrorBadRequest("Missing User header"))?
        .to_str()
        .map_err(|_| ErrorBadRequest("Invalid User header value"))?
        .to_string();
    log_mdc::insert("user", &user);
    Ok(user)
}

/// Declared content type of the uploaded payload
fn content_type(req: &HttpRequest) -> String {
    req.headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string()
}

async fn read_payload(payload: &mut web::Payload) -> Result<BytesMut, Error> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(ErrorInternalServerError)?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Like/unlike request body, matching the original client's shape
#[derive(Debug, Deserialize)]
pub struct LikeAction {
    action: String,
}

fn parse_action(action: &str) -> Result<bool, Error> {
    match action {
        "like" => Ok(true),
        "unlike" => Ok(false),
        other => Err(ErrorBadRequest(format!("Unknown action: {}", other))),
    }
}

fn handle_like<R: MediaRecord>(
    store: &RecordStore<R>,
    id: &str,
    action: &str,
    req: &HttpRequest,
) -> Result<HttpResponse, Error> {
    let user = user_header(req)?;
    let want_liked = parse_action(action)?;
    debug!("{} {} for {} by {}", action, R::KIND_LABEL, id, user);
    let record = store.set_like(id, &user, want_liked)?;
    Ok(HttpResponse::Ok().json(record))
}

fn handle_delete<R: MediaRecord>(
    store: &RecordStore<R>,
    id: &str,
    req: &HttpRequest,
    message: &str,
) -> Result<HttpResponse, Error> {
    let user = user_header(req)?;
    store.delete(id, &user)?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct AlbumUploadParams {
    caption: Option<String>,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SongUploadParams {
    title: Option<String>,
    file_name: Option<String>,
}

#[get("/api/albums")]
pub async fn list_albums(app_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(app_state.albums.list())
}

#[post("/api/albums/upload")]
pub async fn upload_album(
    mut payload: web::Payload,
    query: web::Query<AlbumUploadParams>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user = user_header(&req)?;
    let bytes = read_payload(&mut payload).await?;
    debug!("Album upload by {}: {} bytes", user, bytes.len());

    let record = app_state.albums.create(
        &bytes,
        &content_type(&req),
        NewUpload {
            uploader: user,
            display: query.caption.clone(),
            original_filename: query.file_name.clone(),
        },
    )?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("/api/albums/{id}")]
pub async fn update_album(
    path: web::Path<String>,
    body: web::Json<LikeAction>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    handle_like(&app_state.albums, &path.into_inner(), &body.action, &req)
}

#[delete("/api/albums/{id}")]
pub async fn delete_album(
    path: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    handle_delete(&app_state.albums, &path.into_inner(), &req, "Album deleted")
}

#[get("/api/songs")]
pub async fn list_songs(app_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(app_state.songs.list())
}

#[post("/api/songs/upload")]
pub async fn upload_song(
    mut payload: web::Payload,
    query: web::Query<SongUploadParams>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let user = user_header(&req)?;
    let bytes = read_payload(&mut payload).await?;
    debug!("Song upload by {}: {} bytes", user, bytes.len());

    let record = app_state.songs.create(
        &bytes,
        &content_type(&req),
        NewUpload {
            uploader: user,
            display: query.title.clone(),
            original_filename: query.file_name.clone(),
        },
    )?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("/api/songs/{id}")]
pub async fn update_song(
    path: web::Path<String>,
    body: web::Json<LikeAction>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    handle_like(&app_state.songs, &path.into_inner(), &body.action, &req)
}

#[delete("/api/songs/{id}")]
pub async fn delete_song(
    path: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    handle_delete(&app_state.songs, &path.into_inner(), &req, "Song deleted")
}

/// Read-only retrieval of stored blobs at their locator paths
#[get("/uploads/{kind}/{name}")]
pub async fn fetch_blob(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (kind, name) = path.into_inner();
    let locator = format!("/uploads/{}/{}", kind, name);
    let data = app_state.blobs.read(&locator)?;
    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    Ok(HttpResponse::Ok().content_type(mime.as_ref()).body(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_user_header_required() {
        let req = TestRequest::default().to_http_request();
        assert!(user_header(&req).is_err());

        let req = TestRequest::default()
            .insert_header(("User", "alice"))
            .to_http_request();
        assert_eq!(user_header(&req).unwrap(), "alice");
    }

    #[test]
    fn test_content_type_defaults_to_octet_stream() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(content_type(&req), "application/octet-stream");

        let req = TestRequest::default()
            .insert_header(("content-type", "image/jpeg"))
            .to_http_request();
        assert_eq!(content_type(&req), "image/jpeg");
    }

    #[test]
    fn test_parse_action() {
        assert!(parse_action("like").unwrap());
        assert!(!parse_action("unlike").unwrap());
        assert!(parse_action("repost").is_err());
    }
}
