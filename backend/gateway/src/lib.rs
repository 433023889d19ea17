//! textlift HTTP gateway
//!
//! The editor page, OCR extraction, edit rendering, downloads, and the
//! health/debug endpoints, assembled into one axum router.

pub mod control_ui;
pub mod debug_api;
pub mod error;
pub mod extract;
pub mod health_api;
pub mod server;
pub mod update;

pub use error::ApiError;
pub use server::{build_router, serve_listener, shutdown_signal, start_server, GatewayState};
