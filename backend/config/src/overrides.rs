//! Deployment environment detection and env-var overrides.
//!
//! The platform sets `PORT` (and `RENDER` on Render.com); both mark a
//! production deployment, which binds on all interfaces.

use crate::schema::{LogFormat, ServiceConfig};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn detect(env: &HashMap<String, String>) -> Self {
        let set = |k: &str| env.get(k).is_some_and(|v| !v.is_empty());
        if set("RENDER") || set("PORT") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn default_bind_address(self) -> &'static str {
        match self {
            Environment::Production => "0.0.0.0",
            Environment::Development => "127.0.0.1",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "Production"),
            Environment::Development => write!(f, "Development"),
        }
    }
}

/// Apply env-var overrides on top of the file config.
pub fn apply_env_overrides(mut config: ServiceConfig, env: &HashMap<String, String>) -> ServiceConfig {
    let get = |k: &str| env.get(k).map(String::as_str).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT").and_then(|v| parse_or_warn::<u16>("PORT", v)) {
        config.server.port = port;
    }
    if let Some(bind) = get("TEXTLIFT_BIND") {
        config.server.bind_address = Some(bind.to_string());
    }
    if let Some(workers) = get("TEXTLIFT_WORKERS").and_then(|v| parse_or_warn("TEXTLIFT_WORKERS", v)) {
        config.server.workers = workers;
    }
    if let Some(secs) = get("TEXTLIFT_REQUEST_TIMEOUT")
        .and_then(|v| parse_or_warn("TEXTLIFT_REQUEST_TIMEOUT", v))
    {
        config.server.request_timeout_secs = secs;
    }
    if let Some(dir) = get("TEXTLIFT_UPLOAD_DIR") {
        config.storage.upload_dir = PathBuf::from(dir);
    }
    if let Some(path) = get("TESSERACT_PATH") {
        config.ocr.tesseract_path = Some(PathBuf::from(path));
    }
    if let Some(level) = get("TEXTLIFT_LOG_LEVEL") {
        config.logging.level = level.to_string();
    }
    if let Some(format) = get("TEXTLIFT_LOG_FORMAT") {
        match format.to_ascii_lowercase().as_str() {
            "json" => config.logging.format = LogFormat::Json,
            "pretty" => config.logging.format = LogFormat::Pretty,
            other => warn!(value = %other, "Ignoring unknown TEXTLIFT_LOG_FORMAT"),
        }
    }
    if let Some(dir) = get("TEXTLIFT_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(dir));
    }

    config
}

fn parse_or_warn<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = key, value = value, "Ignoring unparseable env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn port_or_render_means_production() {
        assert_eq!(Environment::detect(&env(&[("PORT", "10000")])), Environment::Production);
        assert_eq!(Environment::detect(&env(&[("RENDER", "true")])), Environment::Production);
        assert_eq!(Environment::detect(&env(&[])), Environment::Development);
        assert_eq!(Environment::detect(&env(&[("PORT", "")])), Environment::Development);
    }

    #[test]
    fn overrides_port_and_paths() {
        let cfg = apply_env_overrides(
            ServiceConfig::default(),
            &env(&[
                ("PORT", "8080"),
                ("TESSERACT_PATH", "/opt/tess/bin/tesseract"),
                ("TEXTLIFT_UPLOAD_DIR", "/data/uploads"),
                ("TEXTLIFT_WORKERS", "4"),
                ("TEXTLIFT_LOG_FORMAT", "JSON"),
            ]),
        );
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, 4);
        assert_eq!(cfg.ocr.tesseract_path, Some(PathBuf::from("/opt/tess/bin/tesseract")));
        assert_eq!(cfg.storage.upload_dir, PathBuf::from("/data/uploads"));
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn unparseable_override_is_ignored() {
        let cfg = apply_env_overrides(ServiceConfig::default(), &env(&[("PORT", "http")]));
        assert_eq!(cfg.server.port, crate::schema::DEFAULT_PORT);
    }
}
