//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the publish endpoints
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve over plain TCP or rustls, with graceful shutdown

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ServeConfig, Snapshot};
use crate::http::handlers::{publish_routing_rules, publish_servers};
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::publish::PublishService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<PublishService>,
}

/// HTTP server for the publisher.
pub struct HttpServer {
    router: Router,
    config: ServeConfig,
}

impl HttpServer {
    /// Create a new HTTP server over a loaded snapshot.
    pub fn new(snapshot: Arc<Snapshot>, config: ServeConfig) -> Self {
        let state = AppState {
            publisher: Arc::new(PublishService::new(snapshot)),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServeConfig, state: AppState) -> Router {
        tracing::info!("publish servers endpoint: /publish/{{key}}/servers");
        tracing::info!("publish routing rules endpoint: /publish/{{key}}/routingRules/{{rulesID}}");

        Router::new()
            .route("/publish/{key}/servers", get(publish_servers))
            .route("/publish/{key}/routingRules/{rules_id}", get(publish_routing_rules))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(req),
                    method = %req.method(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Publisher listening on http://{}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);

        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, "Publisher listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
