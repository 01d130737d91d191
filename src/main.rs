#![forbid(unsafe_code)]

//! `nutriscan-dashboard` — training console backend binary.
//!
//! Bootstraps configuration, the JSON document stores, the outbound API
//! clients, and the HTTP dispatcher.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use nutriscan_dashboard::clients::{GeminiClient, RoboflowClient};
use nutriscan_dashboard::config::GlobalConfig;
use nutriscan_dashboard::http::{self, AppState, STATS_KEY};
use nutriscan_dashboard::lifecycle::SessionManager;
use nutriscan_dashboard::store::JsonStore;
use nutriscan_dashboard::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "nutriscan-dashboard", about = "NutriScan training console backend", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("nutriscan-dashboard server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;

    // Override data directory from CLI if provided.
    if let Some(dir) = args.data_dir {
        std::fs::create_dir_all(&dir)
            .map_err(|err| AppError::Config(format!("invalid data_dir override: {err}")))?;
        config.data_dir = dir
            .canonicalize()
            .map_err(|err| AppError::Config(format!("invalid data_dir override: {err}")))?;
    }

    // Load API credentials from keyring / env vars.
    config.load_credentials().await?;

    let config = Arc::new(config);
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    // ── Open document stores ────────────────────────────
    let permissive = config.permissive_load;
    let sessions_store = Arc::new(JsonStore::open(
        &config.data_dir,
        "training_sessions",
        permissive,
    ));
    let datasets = Arc::new(JsonStore::open(&config.data_dir, "datasets", permissive));
    let models = Arc::new(JsonStore::open(&config.data_dir, "models", permissive));
    let stats = Arc::new(JsonStore::open(&config.data_dir, "system_stats", permissive));

    // Stamp the stats record on first boot so uptime survives restarts.
    stats
        .update(|records| {
            records.entry(STATS_KEY.to_owned()).or_default();
            Ok(())
        })
        .await?;
    info!("document stores ready");

    // ── Build outbound clients ──────────────────────────
    let external_timeout = Duration::from_secs(config.timeouts.external_seconds);
    let gemini = Arc::new(GeminiClient::new(config.gemini.clone(), external_timeout)?);
    let roboflow = Arc::new(RoboflowClient::new(config.roboflow.clone(), external_timeout)?);

    // ── Build shared application state ──────────────────
    let sessions = SessionManager::new(Arc::clone(&sessions_store), Arc::clone(&config));
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        sessions,
        datasets,
        models,
        stats,
        gemini,
        roboflow,
    });

    // ── Start HTTP server ───────────────────────────────
    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server_state = Arc::clone(&state);
    let server_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(server_state, server_ct).await {
            error!(%err, "http server failed");
        }
    });

    info!(port = config.http_port, "dashboard ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = tokio::join!(server_handle);
    info!("nutriscan-dashboard shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
