//! `POST /upload` - extract the text of one uploaded PDF or spreadsheet
//!
//! The file arrives as the multipart field `file`. It is held in memory for
//! the duration of the request only and never written anywhere.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::{Bytes, BytesMut};
use tracing::{info, warn};

use crate::extract::DocumentKind;
use crate::models::UploadResponse;
use crate::types::{AppError, AppResult};

/// Largest accepted file, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// Room for boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const FILE_FIELD: &str = "file";

pub fn router() -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/api/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
}

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

async fn upload_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Upload is not a multipart request: {}", rejection);
        AppError::NoFileUploaded
    })?;

    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or(AppError::NoFileUploaded)?;

    let kind = DocumentKind::from_mime(&upload.content_type)
        .ok_or_else(|| AppError::UnsupportedFileType(upload.content_type.clone()))?;

    info!(
        filename = %upload.filename,
        content_type = %upload.content_type,
        size = upload.data.len(),
        "Processing uploaded file"
    );

    let content = kind
        .extract_blocking(upload.data)
        .await
        .map_err(|e| AppError::Extraction(format!("{} ({}): {}", upload.filename, kind.mime_type(), e)))?;

    info!(filename = %upload.filename, content_bytes = content.len(), "File processed");
    Ok(Json(UploadResponse { content }))
}

/// Find the `file` part and buffer it, enforcing [`MAX_UPLOAD_BYTES`] while streaming.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A `file` part without a filename is a plain form value, not an upload.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        // Parts without a declared type are treated as opaque binary.
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = read_limited(field).await?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }

    Ok(None)
}

async fn read_limited(mut field: Field<'_>) -> AppResult<Bytes> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::FileTooLarge);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge
    } else {
        warn!("Malformed multipart body: {}", err.body_text());
        AppError::NoFileUploaded
    }
}
