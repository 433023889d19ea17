//! `POST /update_image`: draw edited blocks over the stored upload.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::time::Instant;
use textlift_core::{TextBlock, TextliftError, UpdateImageRequest, UpdateImageResponse};
use textlift_logging::{EventLogger, RequestEvent};
use textlift_media::{png_data_url, render_edits, save_image};
use tokio::task::JoinError;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;

#[instrument(skip_all)]
pub async fn update_image(
    State(state): State<GatewayState>,
    body: Result<Json<UpdateImageRequest>, JsonRejection>,
) -> Result<Json<UpdateImageResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    let result = match body {
        Ok(Json(request)) => run_update(&state, request).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    match result {
        Ok((response, drawn, skipped)) => {
            EventLogger::log_event(
                &request_id,
                RequestEvent::UpdateImage {
                    filename: response.filename.clone(),
                    drawn,
                    skipped,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            );
            Ok(Json(response))
        }
        Err(err) => {
            EventLogger::log_event(
                &request_id,
                RequestEvent::Error {
                    route: "/update_image".into(),
                    error_msg: err.message.clone(),
                },
            );
            Err(err)
        }
    }
}

/// Blocks that deserialise, plus one message per block that did not.
pub fn parse_blocks(raw: Vec<serde_json::Value>) -> (Vec<TextBlock>, Vec<String>) {
    let mut blocks = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for (idx, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<TextBlock>(value) {
            Ok(block) => blocks.push(block),
            Err(e) => {
                warn!(block = idx + 1, error = %e, "Malformed text block");
                rejected.push(format!("block {}: {e}", idx + 1));
            }
        }
    }
    (blocks, rejected)
}

/// A crashed render task is logged; the client only gets a generic error.
fn render_task_failed(err: JoinError) -> TextliftError {
    error!(error = %err, "Render task failed");
    TextliftError::Render("could not render the edited image".into())
}

async fn run_update(
    state: &GatewayState,
    request: UpdateImageRequest,
) -> Result<(UpdateImageResponse, usize, usize), ApiError> {
    let image_path = request.image_path.filter(|p| !p.trim().is_empty());
    let raw_blocks = request.text_blocks.filter(|b| !b.is_empty());
    let (Some(image_path), Some(raw_blocks)) = (image_path, raw_blocks) else {
        return Err(ApiError::bad_request("Missing required data"));
    };

    let Some(original_path) = state.store.resolve_client_path(&image_path).await else {
        return Err(ApiError::not_found("Original image not found"));
    };
    let filename = state
        .store
        .edited_name(&original_path)
        .ok_or_else(|| TextliftError::InvalidRequest("Invalid image path".into()))?;
    let output_path = state.store.dir().join(&filename);

    let (blocks, rejected) = parse_blocks(raw_blocks);
    info!(
        image = %original_path.display(),
        blocks = blocks.len(),
        rejected = rejected.len(),
        "Rendering edits"
    );

    let bytes = tokio::fs::read(&original_path).await.map_err(TextliftError::from)?;
    let fonts = state.fonts.clone();
    let (edited_image, drawn, skipped) = tokio::task::spawn_blocking(move || {
        let original = image::load_from_memory(&bytes)
            .map_err(|e| TextliftError::InvalidImage(e.to_string()))?;
        let outcome = render_edits(&original, &blocks, &fonts);
        let edited = image::DynamicImage::ImageRgb8(outcome.image);
        save_image(&edited, &output_path)?;
        let data_url = png_data_url(&edited)?;
        Ok::<_, TextliftError>((data_url, outcome.drawn, outcome.skipped.len()))
    })
    .await
    .map_err(render_task_failed)??;

    let skipped = skipped + rejected.len();
    info!(filename = %filename, drawn, skipped, "Edited image saved");

    Ok((
        UpdateImageResponse {
            success: true,
            edited_image,
            filename,
        },
        drawn,
        skipped,
    ))
}
