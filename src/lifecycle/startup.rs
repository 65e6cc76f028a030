//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including a configuration that
//!   does not validate
//! - Listeners start last (traffic only when the snapshot is ready)

use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_config, ConfigError, ServeConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to load TLS certificate: {0}")]
    Tls(#[source] io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Log the version banner.
pub fn log_banner() {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "vmess-publisher starting"
    );
}

/// Load the configuration, then serve until `shutdown` fires.
pub async fn run(
    config_path: &Path,
    config: ServeConfig,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let snapshot = Arc::new(load_config(config_path)?);

    if let Some(address) = &config.observability.metrics_address {
        let addr = listener::resolve(address).await?;
        metrics::init_metrics(addr)?;
    }

    let addr = listener::resolve(&config.listener.bind_address).await?;
    let tls = match &config.listener.tls {
        Some(tls) => Some(load_tls_config(tls).await.map_err(StartupError::Tls)?),
        None => None,
    };

    let server = HttpServer::new(snapshot, config);
    match tls {
        Some(tls) => server
            .run_tls(addr, tls, shutdown.subscribe())
            .await
            .map_err(StartupError::Serve),
        None => {
            tracing::warn!(
                "Publisher running without HTTPS. This discloses server details to anyone \
                 on the path; use it only behind a TLS-terminating reverse proxy"
            );
            let tcp = listener::bind(addr).await?;
            server
                .run(tcp, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)
        }
    }
}
