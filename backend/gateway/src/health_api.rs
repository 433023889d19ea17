//! Liveness endpoint.
//!
//! Always 200 while the process is up; `tesseract` reports whether the
//! binary actually answered a version query.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::server::GatewayState;

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<Value> {
    let (available, version, path) = match &state.ocr {
        Some(ocr) => {
            let path = ocr.engine().command_path().display().to_string();
            match ocr.engine().version().await {
                Ok(v) => (true, v, Some(path)),
                Err(e) => (false, format!("Error: {e}"), Some(path)),
            }
        }
        None => (false, "Error: tesseract not found".to_string(), None),
    };

    Json(json!({
        "status": "ok",
        "tesseract": available,
        "version": version,
        "tesseract_path": path,
        "uptime_seconds": state.uptime_seconds(),
    }))
}
