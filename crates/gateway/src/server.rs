//! HTTP server lifecycle
//!
//! Binding and serving are split so the caller can log the bound address
//! (and tests can use an ephemeral port) before the serve loop takes over.
//! Shutdown is coordinated through a `CancellationToken`; in-flight
//! requests are drained gracefully.

use axum::Router;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid listen address {address}")]
    InvalidAddress { address: String },

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Bind the gateway listener
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, GatewayError> {
    let address = format!("{host}:{port}");
    let addr: SocketAddr = address
        .parse()
        .map_err(|_| GatewayError::InvalidAddress {
            address: address.clone(),
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind { address, source })?;
    Ok(listener)
}

/// Serve `router` on `listener` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), GatewayError> {
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "Gateway listening");

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Gateway received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("Gateway shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(%e, "Gateway server error");
            Err(GatewayError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn bind_uses_an_ephemeral_port_when_asked() {
        let listener = bind("127.0.0.1", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn bad_host_is_rejected() {
        let result = bind("not a host", 8080).await;
        assert!(matches!(result, Err(GatewayError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let listener = bind("127.0.0.1", 0).await.unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, Router::new(), shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.is_ok(), "server should shut down promptly");
    }
}
