/// API route handlers.
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use ytrelay_downloader::command::{DEFAULT_FORMAT, DEFAULT_TEMPLATE};
use ytrelay_downloader::{Cookies, DownloadOutcome, FetchRequest};
use ytrelay_shared::errors::RelayError;
use ytrelay_shared::models::{MediaMetadata, StoredFile};

use crate::errors::ApiError;
use crate::AppState;

// ====== REQUEST / RESPONSE TYPES ======

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct FilesResponse {
    pub files: Vec<StoredFile>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InfoBody {
    pub url: Option<String>,
    pub cookies: Option<String>,
    pub cookies_content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadBody {
    pub url: Option<String>,
    pub format: Option<String>,
    pub filename: Option<String>,
    pub cookies: Option<String>,
    pub cookies_content: Option<String>,
}

fn required_url(url: Option<&str>) -> Result<&str, ApiError> {
    url.map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))
}

async fn prepare_cookies(
    state: &AppState,
    path: Option<&str>,
    content: Option<&str>,
) -> Result<Cookies, ApiError> {
    Cookies::prepare(state.downloader.store().root(), path, content)
        .await
        .map_err(|e| {
            warn!("Failed to write temp cookie file: {}", e);
            ApiError::internal("Failed to prepare cookies").with_details(e.to_string())
        })
}

// ====== HEALTH ======

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "yt-dlp API is running".to_string(),
    })
}

// ====== MEDIA ROUTES ======

/// POST /info - Metadata for a URL, no download
pub async fn info(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InfoBody>, JsonRejection>,
) -> Result<Json<MediaMetadata>, ApiError> {
    let Json(body) = body?;
    let url = required_url(body.url.as_deref())?;

    let cookies = prepare_cookies(&state, body.cookies.as_deref(), body.cookies_content.as_deref()).await?;

    let meta = state
        .downloader
        .info(url, cookies.path())
        .await
        .map_err(|e| {
            warn!("Info failed for {}: {}", url, e);
            ApiError::from_relay("Failed to get video info", e)
        })?;

    info!("Info served: url={} formats={}", url, meta.formats.len());
    Ok(Json(meta))
}

/// POST /download - Fetch a URL into the download directory
pub async fn download(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let url = required_url(body.url.as_deref())?;
    let format = body
        .format
        .as_deref()
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FORMAT);
    let template = body
        .filename
        .as_deref()
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE);

    // Dropped on every exit path below, which removes any temp cookie file.
    let cookies = prepare_cookies(&state, body.cookies.as_deref(), body.cookies_content.as_deref()).await?;

    let request = FetchRequest {
        url,
        format,
        template,
        cookies: cookies.path(),
    };

    let outcome = state.downloader.download(&request).await.map_err(|e| {
        warn!("Download failed for {}: {}", url, e);
        ApiError::from_relay("Download failed", e)
    })?;

    let response = match outcome {
        DownloadOutcome::Confirmed { filename, path } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Download completed successfully",
                "filename": filename,
                "path": path.display().to_string(),
            })),
        ),
        DownloadOutcome::Unconfirmed { output_path } => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "success": true,
                "message": "Download completed but the output file could not be confirmed",
                "outputPath": output_path.display().to_string(),
            })),
        ),
    };
    Ok(response.into_response())
}

// ====== FILES ROUTES ======

/// GET /downloads
pub async fn list_downloads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilesResponse>, ApiError> {
    let files = state.downloader.store().list().await.map_err(|e| {
        warn!("Listing downloads failed: {}", e);
        ApiError::from_relay("Failed to list downloads", e)
    })?;
    Ok(Json(FilesResponse { files }))
}

/// GET /downloads/:filename - Stream a file as an attachment
pub async fn serve_download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, len) = state
        .downloader
        .store()
        .open(&filename)
        .await
        .map_err(|e| match e {
            RelayError::NotFound(_) => ApiError::not_found("File not found"),
            RelayError::Validation(_) => ApiError::bad_request("Invalid filename"),
            e => ApiError::from_relay("Failed to read file", e),
        })?;

    let body = Body::from_stream(ReaderStream::new(file));
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "_"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// DELETE /downloads/:filename
pub async fn delete_download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .downloader
        .store()
        .delete(&filename)
        .await
        .map_err(|e| match e {
            RelayError::Validation(_) => ApiError::bad_request("Invalid filename"),
            _ => ApiError::not_found("File not found or could not be deleted"),
        })?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}

/// Any route not matched above.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "m4a" | "aac" => "audio/mp4",
        "opus" | "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}
