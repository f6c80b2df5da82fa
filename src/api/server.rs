use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::routes::{build_router, ApiState};
use crate::{config::ServerConfig, errors::Error};

/// Bind the configured address and serve until `shutdown` is cancelled.
pub async fn start_api_server(
    config: &ServerConfig,
    state: ApiState,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid bind address '{}': {}", config.bind, e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    run_http_server(listener, build_router(state), shutdown).await?;

    info!("API server shutdown completed");
    Ok(())
}

pub async fn run_http_server(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))
}
