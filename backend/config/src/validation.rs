//! Config validation with user-friendly error messages.

use crate::schema::ServiceConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Upper bound on runtime worker threads.
pub const MAX_WORKERS: usize = 256;

static LANGUAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_]+(\+[a-z_]+)*$").expect("static regex"));

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return every problem found.
pub fn validate(config: &ServiceConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_ocr(config, &mut report);
    validate_storage(config, &mut report);
    report
}

fn validate_server(config: &ServiceConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == 0 {
        report.error("server.port", "Port must be between 1 and 65535");
    }
    if server.workers == 0 || server.workers > MAX_WORKERS {
        report.error(
            "server.workers",
            format!("workers must be between 1 and {MAX_WORKERS}"),
        );
    } else if let Ok(cpus) = std::thread::available_parallelism() {
        if let Some(message) = oversubscription_warning(server.workers, cpus.get()) {
            report.warn("server.workers", message);
        }
    }
    if server.request_timeout_secs == 0 {
        report.error("server.requestTimeoutSecs", "requestTimeoutSecs must be > 0");
    }
    if server.max_upload_bytes == 0 {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

/// Workers per CPU beyond which the extra threads mostly sit idle.
pub const WORKERS_PER_CPU: usize = 4;

fn oversubscription_warning(workers: usize, cpus: usize) -> Option<String> {
    (workers > cpus * WORKERS_PER_CPU)
        .then(|| format!("{workers} workers on {cpus} CPUs will mostly sit idle"))
}

fn validate_ocr(config: &ServiceConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    if ocr.oem > 3 {
        report.error("ocr.oem", "oem must be between 0 and 3");
    }
    if ocr.psm > 13 {
        report.error("ocr.psm", "psm must be between 0 and 13");
    }
    if !(ocr.contrast.is_finite() && ocr.contrast > 0.0) {
        report.error("ocr.contrast", "contrast must be a positive number");
    } else if ocr.contrast > 4.0 {
        report.warn("ocr.contrast", "contrast above 4 usually destroys glyph edges");
    }
    if !LANGUAGE_PATTERN.is_match(&ocr.language) {
        report.error(
            "ocr.language",
            format!("'{}' is not a tesseract language code (e.g. eng or eng+deu)", ocr.language),
        );
    }
    if ocr.timeout_secs == 0 {
        report.error("ocr.timeoutSecs", "timeoutSecs must be > 0");
    }
    if ocr.max_concurrent == Some(0) {
        report.error("ocr.maxConcurrent", "maxConcurrent must be > 0");
    }
}

fn validate_storage(config: &ServiceConfig, report: &mut ValidationReport) {
    if config.storage.upload_dir.as_os_str().is_empty() {
        report.error("storage.uploadDir", "uploadDir cannot be empty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let report = validate(&ServiceConfig::default());
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn rejects_out_of_range_ocr_modes() {
        let mut cfg = ServiceConfig::default();
        cfg.ocr.oem = 4;
        cfg.ocr.psm = 14;
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"ocr.oem"));
        assert!(paths.contains(&"ocr.psm"));
    }

    #[test]
    fn warns_only_past_four_workers_per_cpu() {
        assert_eq!(oversubscription_warning(8, 2), None);
        let message = oversubscription_warning(9, 2).unwrap();
        assert!(message.contains("9 workers on 2 CPUs"));
    }

    #[test]
    fn rejects_zero_workers_and_port() {
        let mut cfg = ServiceConfig::default();
        cfg.server.workers = 0;
        cfg.server.port = 0;
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn language_codes() {
        let mut cfg = ServiceConfig::default();
        cfg.ocr.language = "eng+deu".into();
        assert!(validate(&cfg).is_valid());
        cfg.ocr.language = "eng;rm -rf".into();
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn high_contrast_is_only_a_warning() {
        let mut cfg = ServiceConfig::default();
        cfg.ocr.contrast = 6.0;
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
