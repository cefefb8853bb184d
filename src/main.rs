//! Application router service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ application resolver ──▶ JSON resolution
//!                          │                  │
//!                          │                  ▼
//!                          │          application registry ◀── applications/<name>/config/*.toml
//!                          │                  ▲
//!                          ▼                  │
//!                    observability      watcher / SIGHUP reload
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use app_router::config::loader::load_config;
use app_router::http::HttpServer;
use app_router::lifecycle::signals::run_signal_loop;
use app_router::lifecycle::{Services, Shutdown};
use app_router::observability::{logging, metrics};
use app_router::RouterConfig;

#[derive(Parser)]
#[command(name = "app-router")]
#[command(about = "Resolves requests to their owning application", long_about = None)]
struct Args {
    /// Router configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("app-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        application_path = %config.application_path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let services = Services::initialize(&config)?;
    tracing::info!(watching = services.is_watching(), "Services initialized");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(run_signal_loop(shutdown.clone(), services.registry.clone()));

    let server = HttpServer::new(&config, services.resolver.clone());
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
