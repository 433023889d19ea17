//! `textlift-config`: runtime configuration for the textlift service.
//!
//! Provides:
//! - Typed config schema (server, OCR, storage, fonts, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Deployment environment detection and env-var overrides
//! - Derived defaults and validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod overrides;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_raw_config, DEFAULT_CONFIG_FILE};
pub use overrides::{apply_env_overrides, Environment};
pub use schema::{
    FontsConfig, LogFormat, LoggingConfig, OcrConfig, ServerConfig, ServiceConfig, StorageConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// A validated config plus what the pipeline learned along the way.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: ServiceConfig,
    pub environment: Environment,
    /// Non-fatal findings. Returned rather than logged so callers can emit
    /// them once their subscriber is installed.
    pub warnings: Vec<ConfigValidationError>,
}

/// Load, substitute env vars, apply overrides and defaults, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path, env: &HashMap<String, String>) -> Result<PreparedConfig> {
    let raw = load_raw_config(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: ServiceConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in {}", path.display()))?;

    let environment = Environment::detect(env);
    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config, environment);

    let report = validate(&config);
    if !report.is_valid() {
        let messages: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }

    Ok(PreparedConfig {
        config,
        environment,
        warnings: report.warnings,
    })
}

/// Emit each warning through `tracing`.
pub fn log_warnings(warnings: &[ConfigValidationError]) {
    for warning in warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
}
