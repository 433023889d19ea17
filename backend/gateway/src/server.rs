//! Router assembly and the HTTP listener.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use textlift_config::ServiceConfig;
use textlift_media::{download_router, FontBook, UploadStore};
use textlift_ocr::{OcrService, TesseractLocation};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{control_ui, debug_api, extract, health_api, update};

/// State shared by every route.
#[derive(Clone)]
pub struct GatewayState {
    /// `None` when no tesseract binary could be located.
    pub ocr: Option<Arc<OcrService>>,
    pub tesseract: Option<TesseractLocation>,
    pub store: Arc<UploadStore>,
    pub fonts: Arc<FontBook>,
    pub config: Arc<ServiceConfig>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(
        config: ServiceConfig,
        ocr: Option<Arc<OcrService>>,
        tesseract: Option<TesseractLocation>,
    ) -> Self {
        let store = UploadStore::new(&config.storage.upload_dir);
        let fonts = FontBook::new(config.fonts.extra_paths.clone());
        Self {
            ocr,
            tesseract,
            store: Arc::new(store),
            fonts: Arc::new(fonts),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub fn build_router(state: GatewayState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let body_limit = state.config.server.max_upload_bytes;
    let downloads = download_router(state.store.clone());

    Router::new()
        .route("/", get(control_ui::index))
        .route("/health", get(health_api::get_health))
        .route("/debug", get(debug_api::get_debug))
        .route("/extract_text", post(extract::extract_text))
        .route("/update_image", post(update::update_image))
        .with_state(state)
        .merge(downloads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve `app` until `shutdown` resolves.
#[instrument(skip(app, shutdown))]
pub async fn start_server<F>(addr: &str, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve_listener(listener, app, shutdown).await
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
pub async fn serve_listener<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
