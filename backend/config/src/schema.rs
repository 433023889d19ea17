//! textlift runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional in
//! the file; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Port the service listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 10000;

/// Worker threads serving requests.
pub const DEFAULT_WORKERS: usize = 2;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Largest accepted request body (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for textlift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub fonts: FontsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Bind address; derived from the deployment environment when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,
    pub port: u16,
    /// Runtime worker threads.
    pub workers: usize,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    /// Explicit tesseract binary; takes priority over auto-detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<PathBuf>,
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,
    /// OCR engine mode (`--oem`).
    pub oem: u8,
    /// Page segmentation mode (`--psm`).
    pub psm: u8,
    /// Contrast enhancement factor applied before recognition.
    pub contrast: f32,
    pub timeout_secs: u64,
    /// Concurrent tesseract processes; defaults to the worker count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            language: "eng".to_string(),
            oem: 3,
            psm: 6,
            contrast: 1.5,
            timeout_secs: 60,
            max_concurrent: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Storage / fonts / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontsConfig {
    /// Font files tried after the built-in family table.
    pub extra_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Directory for the rolling NDJSON log; console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Address string for the listener, e.g. `0.0.0.0:10000`.
    pub fn listen_addr(&self) -> String {
        let bind = self.server.bind_address.as_deref().unwrap_or("127.0.0.1");
        format!("{}:{}", bind, self.server.port)
    }
}
