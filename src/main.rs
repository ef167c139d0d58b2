//! # Sweep Dash
//!
//! Live ignition-advance sweep dashboard for an engine-control device.
//!
//! Connects to the device over WebSocket, logs one advance sample per new
//! RPM high, and keeps an advance-over-RPM chart up to date. The operator
//! drives it with text commands on stdin.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sweep_dash::config::{Config, LoggingConfig};
use sweep_dash::connection::transport::LogIndicator;
use sweep_dash::connection::websocket::WsConnector;
use sweep_dash::control::read_controls;
use sweep_dash::dashboard::Dashboard;
use sweep_dash::sampler::export::DirectoryExport;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily-rotated log files
const LOG_FILE_PREFIX: &str = "sweep-dash.log";

/// Main entry point for Sweep Dash
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else `config/default.toml`, else defaults)
///    - Set up logging with tracing subscriber
///    - Start reading operator commands from stdin
///
/// 2. **Main Loop**
///    - Connect to the device and reconnect after every close
///    - Log sweep samples and redraw the chart as frames arrive
///    - Apply operator commands (`adv`, `reset`, `export`, `move`, `svg`, ...)
///
/// 3. **Graceful Shutdown**
///    - On `quit` or Ctrl+C, close the device link and exit
///
/// # Errors
///
/// Returns error if the configuration file exists but cannot be loaded
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO sweep_dash: Sweep Dash v0.1.0 starting...
/// INFO sweep_dash::connection: Trying to open a connection (attempt #1)...
/// INFO sweep_dash::connection: Connection opened
/// ```
fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1).as_deref())?;
    let _guard = init_logging(&config.logging);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the runtime")?;
    let result = runtime.block_on(run(config));

    // The stdin reader sits in a blocking read that cannot be cancelled
    runtime.shutdown_background();
    result
}

async fn run(config: Config) -> Result<()> {
    info!("Sweep Dash v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Device address: {}", config.connection.url);

    let (link_tx, link_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if let Err(e) = read_controls(BufReader::new(tokio::io::stdin()), control_tx).await {
            warn!("Stopped reading commands: {}", e);
        }
    });

    let mut dashboard = Dashboard::new(
        &config,
        Box::new(WsConnector::new(config.connection.url.clone())),
        Box::new(LogIndicator),
        Box::new(DirectoryExport::new(&config.export.dir)),
        link_tx,
    );

    info!("Commands: adv <deg>, reset, export, move <x> <y>, leave, resize <w> <h>, svg <file>, status, clear-peak, quit");
    info!("Press Ctrl+C to exit");

    let interrupted = tokio::select! {
        result = dashboard.run(link_rx, control_rx) => {
            result?;
            false
        }

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("Received Ctrl+C, shutting down...");
        dashboard.shutdown();
    }

    info!("Samples logged this session: {}", dashboard.sampler().log().len());
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("failed to load {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("failed to load {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    if config.dir.is_empty() {
        registry.init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}
