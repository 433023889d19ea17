//! Request Event Logger
//!
//! One structured record per handled request, emitted under the
//! `request_events` target so it can be filtered or shipped separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Characters of user text kept in a log record.
pub const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RequestEvent {
    ExtractText {
        filename: String,
        blocks: usize,
        preview: String,
        elapsed_ms: u64,
    },
    UpdateImage {
        filename: String,
        drawn: usize,
        skipped: usize,
        elapsed_ms: u64,
    },
    Download {
        filename: String,
        bytes: usize,
    },
    Error {
        route: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: RequestEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Emit one request event through the tracing system as JSON.
    pub fn log_event(request_id: &str, event: RequestEvent) -> EventLogEntry {
        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "request_events", request_id = %entry.request_id, event = %payload, "Request event");
        entry
    }
}

/// First `PREVIEW_CHARS` characters of `text`, with an ellipsis if cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
