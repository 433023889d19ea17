mod config;
mod doctor_cmd;
mod healthcheck_cmd;
mod status_cmd;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

use textlift_config::{log_warnings, schema::DEFAULT_PORT, Environment, ServiceConfig};
use textlift_gateway::{build_router, shutdown_signal, start_server, GatewayState};
use textlift_logging::init_logger;
use textlift_ocr::{OcrEngine, OcrService, TesseractEngine, TesseractLocator};

#[derive(Parser)]
#[command(name = "textlift")]
#[command(about = "textlift: extract, edit and re-render text in images")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $TEXTLIFT_CONFIG, then ./textlift.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Runtime worker threads
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Check the local /health endpoint; exits non-zero on failure
    Healthcheck {
        /// Full URL to check instead of the local /health endpoint
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
    /// Check that this host is provisioned to serve
    Doctor,
    /// Show the health report of a running server
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { port, workers } => serve(config_path, port, workers).map(|()| true),
        Commands::Healthcheck {
            url,
            port,
            timeout_secs,
        } => bootstrap_runtime().map(|rt| {
            rt.block_on(async {
                let port = resolve_port(config_path, port).await;
                let url = healthcheck_cmd::health_url(url, port);
                healthcheck_cmd::run(&url, Duration::from_secs(timeout_secs)).await
            })
        }),
        Commands::Doctor => {
            bootstrap_runtime().and_then(|rt| rt.block_on(doctor_cmd::run(config_path)))
        }
        Commands::Status { port } => bootstrap_runtime().and_then(|rt| {
            rt.block_on(async {
                let port = resolve_port(config_path, port).await;
                status_cmd::run(port).await.map(|()| true)
            })
        }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Single-threaded runtime for the short-lived subcommands and config loading.
fn bootstrap_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// `--port`, else the configured port, else the default.
async fn resolve_port(config_path: Option<&Path>, port: Option<u16>) -> u16 {
    if let Some(port) = port {
        return port;
    }
    match config::load(config_path).await {
        Ok(prepared) => prepared.config.server.port,
        Err(_) => DEFAULT_PORT,
    }
}

fn serve(config_path: Option<&Path>, port: Option<u16>, workers: Option<usize>) -> Result<()> {
    let prepared = bootstrap_runtime()?.block_on(config::load(config_path))?;
    let environment = prepared.environment;
    let mut config = prepared.config;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(workers) = workers {
        ensure!(workers >= 1, "--workers must be at least 1");
        config.server.workers = workers;
    }

    init_logger(&config.logging);
    log_warnings(&prepared.warnings);

    let runtime = Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .thread_name("textlift-worker")
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_server(config, environment))
}

async fn run_server(config: ServiceConfig, environment: Environment) -> Result<()> {
    let addr = config.listen_addr();
    info!("🚀 Starting textlift server on port {}", config.server.port);
    info!(
        environment = %environment,
        workers = config.server.workers,
        timeout_secs = config.server.request_timeout_secs,
        "Runtime configuration"
    );

    let location = TesseractLocator::new(config.ocr.tesseract_path.clone()).locate();
    let ocr = match &location {
        Some(location) => {
            let engine = Arc::new(TesseractEngine::new(&location.path, &config.ocr));
            match engine.version().await {
                Ok(version) => info!(
                    path = %location.path.display(),
                    source = %location.source,
                    "Tesseract {version}"
                ),
                Err(e) => warn!(path = %location.path.display(), error = %e, "Tesseract found but not runnable"),
            }
            Some(Arc::new(OcrService::new(engine, &config.ocr)))
        }
        None => {
            error!("Tesseract not found; /extract_text will fail until it is installed");
            None
        }
    };

    let state = GatewayState::new(config, ocr, location);
    state
        .store
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create {}", state.store.dir().display()))?;

    info!("📁 Upload folder: {}", state.store.absolute_dir().display());
    info!("🔧 Debug endpoint: /debug");
    info!("💚 Health check: /health");

    let app = build_router(state);
    start_server(&addr, app, shutdown_signal()).await
}
