//! Config defaults: fills values derived from other settings.

use crate::overrides::Environment;
use crate::schema::ServiceConfig;

/// Apply all derived defaults to a loaded config.
pub fn apply_all_defaults(config: ServiceConfig, environment: Environment) -> ServiceConfig {
    let config = apply_bind_default(config, environment);
    apply_ocr_concurrency_default(config)
}

/// Bind on all interfaces in production, loopback otherwise.
fn apply_bind_default(mut config: ServiceConfig, environment: Environment) -> ServiceConfig {
    if config.server.bind_address.is_none() {
        config.server.bind_address = Some(environment.default_bind_address().to_string());
    }
    config
}

/// One tesseract process per worker unless configured.
fn apply_ocr_concurrency_default(mut config: ServiceConfig) -> ServiceConfig {
    if config.ocr.max_concurrent.is_none() {
        config.ocr.max_concurrent = Some(config.server.workers.max(1));
    }
    config
}
