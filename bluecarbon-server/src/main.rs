//! Blue Carbon NDVI/EVI API server.
//!
//! Thin HTTP layer over the `bluecarbon` library: parses configuration,
//! initialises the Earth Engine session once, then serves requests.

use anyhow::{Context, Result};
use bluecarbon::{EarthEngineCollect, RemotePlatform, Session};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;
mod state;

use config::Args;
use state::AppState;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Created outside the async runtime: the platform client is blocking
    let session = Session::from_env().context("Earth Engine initialization failed")?;
    let platform: Arc<dyn RemotePlatform> = Arc::new(EarthEngineCollect::new(session));
    let state = Arc::new(AppState::new(platform.clone(), args.variant));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(serve(args, state))?;

    drop(runtime);
    drop(platform);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(args: Args, state: Arc<AppState>) -> Result<()> {
    let addr = args.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, variant = %args.variant, "Starting Blue Carbon NDVI/EVI API server");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
