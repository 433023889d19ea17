//! `POST /extract_text`: store the upload, run OCR, return blocks.

use axum::extract::{Multipart, State};
use axum::Json;
use std::time::Instant;
use textlift_core::{full_text, ExtractResponse, TextliftError};
use textlift_logging::{preview, EventLogger, RequestEvent};
use textlift_media::png_data_url;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

#[instrument(skip_all)]
pub async fn extract_text(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    let result = run_extract(&state, &mut multipart).await;
    match result {
        Ok((filename, response)) => {
            EventLogger::log_event(
                &request_id,
                RequestEvent::ExtractText {
                    filename,
                    blocks: response.text_blocks.len(),
                    preview: preview(&response.full_text),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            );
            Ok(Json(response))
        }
        Err(err) => {
            EventLogger::log_event(
                &request_id,
                RequestEvent::Error {
                    route: "/extract_text".into(),
                    error_msg: err.message.clone(),
                },
            );
            Err(err)
        }
    }
}

async fn run_extract(
    state: &GatewayState,
    multipart: &mut Multipart,
) -> Result<(String, ExtractResponse), ApiError> {
    let ocr = state
        .ocr
        .as_ref()
        .ok_or(TextliftError::TesseractNotFound)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("No image uploaded"))?;
    if filename.is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    info!(filename = %filename, bytes = bytes.len(), "Processing upload");

    let path = state.store.save(&filename, &bytes).await?;
    let outcome = ocr.extract(bytes.to_vec()).await?;
    let image_base64 = png_data_url(&outcome.original)?;

    let stored_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(filename);
    let response = ExtractResponse {
        full_text: full_text(&outcome.blocks),
        text_blocks: outcome.blocks,
        image_base64,
        image_path: path.display().to_string(),
    };
    Ok((stored_name, response))
}
