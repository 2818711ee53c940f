//! HTTP request handlers
//!
//! Implements the `/info` overlay lookup and the `/video` range-streaming
//! endpoint.

use std::io::SeekFrom;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::PhaseServerError;
use crate::range::{parse_range, StreamWindow, CHUNK_SIZE};
use crate::state::AppState;
use crate::timeline::TimelineSnapshot;

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    NotFound(String),
    BadRequest(String),
    RangeNotSatisfiable(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::RangeNotSatisfiable(msg) => (StatusCode::RANGE_NOT_SATISFIABLE, msg),
            HttpError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, body).into_response()
    }
}

impl From<PhaseServerError> for HttpError {
    fn from(err: PhaseServerError) -> Self {
        match err {
            PhaseServerError::NoAnnotations(_) | PhaseServerError::VideoNotFound(_) => {
                HttpError::NotFound(err.to_string())
            }
            PhaseServerError::MalformedRange(_) => HttpError::BadRequest(err.to_string()),
            PhaseServerError::RangeNotSatisfiable { .. } => {
                HttpError::RangeNotSatisfiable(err.to_string())
            }
            _ => HttpError::InternalError(err.to_string()),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("phase-server v", env!("CARGO_PKG_VERSION"))
}

/// Query parameters for `/info`
#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    /// Current frame index (required)
    pub frame: u64,
    /// Video id; falls back to the configured default
    pub video_id: Option<i64>,
}

/// Overlay snapshot endpoint
/// GET /info?frame=550&video_id=269
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<TimelineSnapshot>, HttpError> {
    let video_id = query.video_id.unwrap_or_else(|| state.default_video_id());
    let snapshot = state.timeline.snapshot(video_id, query.frame)?;
    Ok(Json(snapshot))
}

/// Query parameters for `/video`
#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    /// Video id; falls back to the configured default
    pub video_id: Option<i64>,
}

/// Video streaming endpoint with Range support
/// GET /video?video_id=269  (optional header `Range: bytes=start-end`)
pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideoQuery>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let video_id = query.video_id.unwrap_or_else(|| state.default_video_id());
    let (path, file_size) = state.media.resolve_sized(video_id).await?;

    let range_header = match headers.get(header::RANGE) {
        Some(value) => Some(value.to_str().map_err(|_| {
            HttpError::BadRequest("Invalid Range header: not valid ASCII".to_string())
        })?),
        None => None,
    };

    let Some(range_value) = range_header else {
        // Whole-file path: clients that do not send Range are not seeking.
        let file = File::open(&path)
            .await
            .map_err(|e| HttpError::InternalError(format!("Failed to open video: {}", e)))?;
        tracing::debug!(video_id, file_size, "serving full video");

        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "video/mp4")
            .header(header::CONTENT_LENGTH, file_size.to_string())
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::from_stream(ReaderStream::with_capacity(
                file, CHUNK_SIZE,
            )))
            .map_err(|e| HttpError::InternalError(e.to_string()));
    };

    let window = parse_range(range_value, file_size)?;
    tracing::debug!(
        video_id,
        start = window.start,
        end = window.end,
        file_size,
        "serving partial video"
    );

    let body = range_body(&path, window).await?;

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_RANGE, window.content_range())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, window.content_length().to_string())
        .body(body)
        .map_err(|e| HttpError::InternalError(e.to_string()))
}

/// Lazy chunked body over the window `[start, end]`.
///
/// Chunks are read sequentially in at most `CHUNK_SIZE` pieces; the file
/// handle lives inside the stream and is dropped when the stream is
/// exhausted or the client disconnects.
async fn range_body(path: &std::path::Path, window: StreamWindow) -> Result<Body, HttpError> {
    let mut file = File::open(path)
        .await
        .map_err(|e| HttpError::InternalError(format!("Failed to open video: {}", e)))?;
    file.seek(SeekFrom::Start(window.start))
        .await
        .map_err(|e| HttpError::InternalError(format!("Failed to seek: {}", e)))?;

    let stream = ReaderStream::with_capacity(file.take(window.content_length()), CHUNK_SIZE);
    Ok(Body::from_stream(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::confidence::FixedConfidence;
    use crate::http::create_router;
    use crate::timeline::{PhaseBoundary, TimelineTable};
    use axum::body::to_bytes;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn test_state(video_dir: &TempDir) -> Arc<AppState> {
        let config = ServerConfig {
            data: crate::config::DataConfig {
                video_dir: video_dir.path().to_string_lossy().to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let table = TimelineTable::from_boundaries(vec![
            PhaseBoundary {
                video_id: 269,
                frame: 0,
                phase_id: 1,
                label: "Preparation".to_string(),
            },
            PhaseBoundary {
                video_id: 269,
                frame: 500,
                phase_id: 2,
                label: "Calot triangle dissection".to_string(),
            },
            PhaseBoundary {
                video_id: 269,
                frame: 1200,
                phase_id: 3,
                label: "Clipping and cutting".to_string(),
            },
        ]);
        Arc::new(AppState::new(config, table, Arc::new(FixedConfidence(97.2))))
    }

    fn write_video(dir: &TempDir, video_id: i64, data: &[u8]) {
        std::fs::write(dir.path().join(format!("case_{}.mp4", video_id)), data).unwrap();
    }

    async fn send(state: Arc<AppState>, request: Request<Body>) -> Response {
        create_router(state).oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_range(uri: &str, range: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::RANGE, range)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_info_snapshot() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/info?frame=550&video_id=269")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["current_phase"], "P2 - Calot triangle dissection");
        assert_eq!(json["time_to_next_phase"], "00:26");
        assert_eq!(json["confidence"], "97.2%");
        assert_eq!(json["procedure"], "Cholecystectomy");
    }

    #[tokio::test]
    async fn test_info_default_video_id() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/info?frame=0")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_info_unknown_video_is_404() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/info?frame=0&video_id=1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_info_missing_frame_is_rejected() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/info?video_id=269")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_video_missing_file_is_404() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/video?video_id=269")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_video_full_body() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        write_video(&dir, 269, &data);

        let response = send(test_state(&dir), get("/video?video_id=269")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &data[..]);
    }

    #[tokio::test]
    async fn test_video_range_body() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        write_video(&dir, 269, &data);

        let response = send(
            test_state(&dir),
            get_with_range("/video?video_id=269", "bytes=100-199"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 100-199/4096"
        );
        assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "100");
        assert_eq!(response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &data[100..200]);
    }

    #[tokio::test]
    async fn test_video_open_ended_range() {
        let dir = TempDir::new().unwrap();
        let data = vec![7u8; 2048];
        write_video(&dir, 269, &data);

        let response = send(
            test_state(&dir),
            get_with_range("/video?video_id=269", "bytes=2000-"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "48");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), 48);
    }

    #[tokio::test]
    async fn test_video_malformed_range_is_400() {
        let dir = TempDir::new().unwrap();
        write_video(&dir, 269, &[0u8; 128]);

        let response = send(
            test_state(&dir),
            get_with_range("/video?video_id=269", "byte=0-100"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_video_range_past_eof_is_416() {
        let dir = TempDir::new().unwrap();
        write_video(&dir, 269, &[0u8; 128]);

        let response = send(
            test_state(&dir),
            get_with_range("/video?video_id=269", "bytes=128-"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_health_and_version() {
        let dir = TempDir::new().unwrap();
        let response = send(test_state(&dir), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(test_state(&dir), get("/version")).await;
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"phase-server v"));
    }
}
