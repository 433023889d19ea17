//! Download route: serves stored uploads and edits as attachments.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use textlift_logging::{EventLogger, RequestEvent};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::detect_mime_type;
use crate::storage::{secure_filename, UploadStore};

/// Router serving `GET /download/*filename` from the upload store.
pub fn download_router(store: Arc<UploadStore>) -> Router {
    Router::new()
        .route("/download/*filename", get(download_file))
        .with_state(store)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "File not found" }))).into_response()
}

async fn download_file(
    Path(filename): Path<String>,
    State(store): State<Arc<UploadStore>>,
) -> Response {
    let Some(name) = secure_filename(&filename) else {
        warn!(filename = %filename, "Rejected download name");
        return not_found();
    };
    let Some(path) = store.resolve(&name).await else {
        return not_found();
    };

    debug!(path = %path.display(), "Serving download");
    match fs::read(&path).await {
        Ok(bytes) => {
            EventLogger::log_event(
                &uuid::Uuid::new_v4().to_string(),
                RequestEvent::Download {
                    filename: name.clone(),
                    bytes: bytes.len(),
                },
            );
            let mime = detect_mime_type(&path);
            let disposition = format!("attachment; filename=\"{name}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read download");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
