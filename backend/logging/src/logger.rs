//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional rolling NDJSON file,
//! and `RUST_LOG`-based level control.

use textlift_config::{LogFormat, LoggingConfig};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix of the rolling log: `textlift.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "textlift.log";

/// Initialize the global subscriber. Safe to call more than once.
pub fn init_logger(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stdout).boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed(),
    };

    // Daily rolling NDJSON file when a log directory is configured.
    let mut file_error = None;
    let file_layer = config.log_dir.as_ref().and_then(|dir| {
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(dir)
        {
            Ok(appender) => Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false)
                    .boxed(),
            ),
            Err(e) => {
                file_error = Some(format!("{}: {e}", dir.display()));
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Some(err) = file_error {
        tracing::warn!(error = %err, "File logging disabled; could not open log directory");
    }
}
