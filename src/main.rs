//! Web gateway for the task-pipeline platform.
//!
//! The single public entry point of a deployment: it serves the built web
//! application, and relays `/api` and `/files` traffic to the API server
//! and file server running behind it.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  WEB GATEWAY                  │
//!                      │                                               │
//!     Browser          │  ┌─────────┐    ┌─────────┐    ┌───────────┐  │
//!     ─────────────────┼─▶│   net   │───▶│  http   │─┬─▶│   site    │  │
//!                      │  │listener │    │ server  │ │  │ (webroot) │  │
//!                      │  └─────────┘    └─────────┘ │  └───────────┘  │
//!                      │                             │                 │
//!                      │                 /api, /files│                 │
//!                      │                             ▼                 │
//!                      │                      ┌──────────────┐         │    API server
//!                      │                      │    proxy     │─────────┼──▶ File server
//!                      │                      │  (forward)   │         │
//!                      │                      └──────────────┘         │
//!                      │                                               │
//!                      │  ┌─────────────────────────────────────────┐  │
//!                      │  │          Cross-Cutting Concerns         │  │
//!                      │  │  config · observability · lifecycle     │  │
//!                      │  └─────────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use web_gateway::lifecycle::listen_for_signals;
use web_gateway::observability::{logging, metrics};
use web_gateway::{load_config, BoundedListener, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "web-gateway", version, about = "Web gateway for the task-pipeline platform")]
struct Args {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        webroot = %config.site.webroot.display(),
        api_upstream = %config.upstreams.api.address,
        files_upstream = %config.upstreams.files.address,
        "web-gateway starting"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = BoundedListener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    let server = HttpServer::new(&config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
