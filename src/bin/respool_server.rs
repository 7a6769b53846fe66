//! Resource reservation REST server.
//!
//! ## Usage
//!
//! ```bash
//! # Start the server
//! respool_server config.json state.json --port 8080
//!
//! # Reserve an index
//! curl -X POST http://localhost:8080/reserve/got10/supersecret0
//!
//! # Release it
//! curl -X DELETE http://localhost:8080/release/got10/0/supersecret0
//! ```
//!
//! The configuration file lists the pools to serve; the save file is the
//! durable snapshot, created on first run and reconciled against the
//! configuration on every start.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use respool::api::reservation_router;
use respool::error::SetupError;
use respool::persist::recover;
use respool::{ReservationService, ServiceConfig, SnapshotStore};

#[derive(Parser, Debug)]
#[command(
    name = "respool_server",
    about = "Named, fixed-capacity resource reservation server"
)]
struct Args {
    /// JSON file listing the resources to serve
    config_file: PathBuf,

    /// Durable snapshot file; created on first run
    save_file: PathBuf,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "respool=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = ServiceConfig::from_path(&args.config_file)?;
    info!(
        "Loaded {} configured resources from {}",
        config.resources.len(),
        args.config_file.display()
    );

    let store = SnapshotStore::new(&args.save_file);
    let saved = store.load().map_err(SetupError::LoadSnapshot)?;
    let registry = recover(config.build_pools(), saved);

    let service = Arc::new(ReservationService::new(registry, store));
    let app = reservation_router(service);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process is asked to stop. In-flight requests (and
/// their snapshot commits) run to completion before the server exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
