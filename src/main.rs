//! Origami recommendation service.
//!
//! Usage:
//!     recommendation [--config <path>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use recommendation::config::{load_config, validate_config, Config};
use recommendation::routes::build_service;
use recommendation::server::HttpServer;
use recommendation::util::{init_logging, ShutdownSignal};
use recommendation::AppState;

/// Origami recommendation service with built-in request metrics.
#[derive(Parser, Debug)]
#[command(name = "recommendation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| {
            format!("failed to load configuration from '{}'", path.display())
        })?,
        None => Config::default(),
    };

    // CLI overrides config
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(level) = cli.log_level.clone() {
        config.global.log_level = level;
    }
    validate_config(&config)
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    init_logging(&config.global.log_level, &config.global.log_format)
        .context("failed to initialize logging")?;

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Listen: {}", config.server.listen);
        println!("  Metrics: {} (namespace '{}')", config.metrics.path, config.metrics.namespace);
        println!("  App config: {}", config.server.app_config.display());
        println!("  Static files: {}", config.server.static_dir.display());
        return Ok(());
    }

    info!(
        config_path = ?cli.config,
        listen = %config.server.listen,
        metrics_path = %config.metrics.path,
        "recommendation service starting"
    );

    run(config)
}

/// Run the service with the given configuration.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

/// Async entry point for the service.
async fn run_async(config: Config) -> Result<()> {
    let listen = config.server.listen;
    let state = AppState::from_config(config).context("failed to initialize service")?;

    for name in state.metrics().registry().metric_names() {
        info!(metric = %name, "registered metric");
    }

    let server = HttpServer::bind(listen, build_service(&state))
        .await
        .with_context(|| format!("failed to bind {}", listen))?;

    let shutdown = ShutdownSignal::new();
    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    info!("recommendation service is running");
    info!("press Ctrl+C to stop");

    shutdown.trigger_on_ctrl_c().await;

    let _ = handle.await;

    info!("recommendation service shut down complete");
    Ok(())
}
