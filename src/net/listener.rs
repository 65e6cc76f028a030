//! Listener address resolution and binding.

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The bind address did not resolve.
    #[error("failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to bind to address.
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),
}

/// Resolve `address` (host name or IP, with port) to its first socket address.
pub async fn resolve(address: &str) -> Result<SocketAddr, ListenerError> {
    let resolve_err = |source| ListenerError::Resolve {
        address: address.to_string(),
        source,
    };

    tokio::net::lookup_host(address)
        .await
        .map_err(resolve_err)?
        .next()
        .ok_or_else(|| {
            resolve_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no addresses found",
            ))
        })
}

/// Bind a TCP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
    tracing::debug!(address = ?listener.local_addr().ok(), "Listener bound");
    Ok(listener)
}
