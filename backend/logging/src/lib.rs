//! Structured logging for textlift.
//!
//! Console output (pretty or JSON), optional rolling NDJSON file, and
//! per-request event records.

pub mod event_logger;
pub mod logger;

pub use event_logger::{preview, EventLogEntry, EventLogger, RequestEvent};
pub use logger::init_logger;
