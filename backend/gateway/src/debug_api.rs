//! Deployment diagnostics: where tesseract was looked for and found.

use axum::{extract::State, Json};
use serde_json::{json, Map, Value};
use std::path::Path;
use textlift_ocr::{TesseractLocator, LINUX_PATHS, WINDOWS_PATHS};

use crate::server::GatewayState;

const REPORTED_ENV_VARS: &[&str] = &["PORT", "RENDER", "TESSERACT_PATH"];

/// Handler for `GET /debug`
pub async fn get_debug(State(state): State<GatewayState>) -> Json<Value> {
    let which = TesseractLocator::new(None)
        .which()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let (cmd, version) = match &state.ocr {
        Some(ocr) => {
            let version = match ocr.engine().version().await {
                Ok(v) => v,
                Err(e) => format!("Error: {e}"),
            };
            (Some(ocr.engine().command_path().display().to_string()), version)
        }
        None => (None, "Error: tesseract not found".to_string()),
    };

    let mut path_checks = Map::new();
    for candidate in LINUX_PATHS.iter().take(2).chain(WINDOWS_PATHS.iter().take(1)) {
        path_checks.insert(candidate.to_string(), json!(Path::new(candidate).exists()));
    }

    let mut env_vars = Map::new();
    for name in REPORTED_ENV_VARS {
        let value = std::env::var(name).unwrap_or_else(|_| "Not set".into());
        env_vars.insert(name.to_string(), json!(value));
    }

    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    Json(json!({
        "service_version": env!("CARGO_PKG_VERSION"),
        "tesseract_cmd": cmd,
        "tesseract_configured": state.ocr.is_some(),
        "tesseract_source": state.tesseract.as_ref().map(|t| t.source.to_string()),
        "which_tesseract": which,
        "tesseract_version": version,
        "cwd": cwd,
        "upload_folder": state.store.absolute_dir().display().to_string(),
        "path_checks": path_checks,
        "env_vars": env_vars,
    }))
}
