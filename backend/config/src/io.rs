//! Config file loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file picked up from the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "textlift.yaml";

/// Resolve which config file to read.
/// Priority: explicit path > `TEXTLIFT_CONFIG` env > `./textlift.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("TEXTLIFT_CONFIG") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Read the config file as a raw JSON value tree.
///
/// Returns an empty object if the file doesn't exist, so every section
/// falls back to its defaults.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_raw_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn invalid_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textlift.yaml");
        std::fs::write(&path, "server: [unclosed").unwrap();
        let err = load_raw_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("textlift.yaml"));
    }

    #[test]
    fn explicit_path_wins() {
        let p = config_file_path(Some(Path::new("/etc/textlift.yaml")));
        assert_eq!(p, PathBuf::from("/etc/textlift.yaml"));
    }
}
