//! VMess subscription publisher.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                    PUBLISHER                      │
//!                       │                                                   │
//!   config.json ───────▶│  config::loader → validation → Snapshot (Arc)     │
//!   (read once)         │                                   │               │
//!                       │                                   ▼               │
//!   GET /publish/...    │  ┌─────────┐    ┌─────────┐    ┌──────────────┐   │
//!   ───────────────────▶│  │   net   │───▶│  http   │───▶│   publish    │   │
//!                       │  │ tls/tcp │    │ router  │    │   service    │   │
//!                       │  └─────────┘    └─────────┘    └──────┬───────┘   │
//!                       │                                       │           │
//!   base64 servers /    │                 ┌─────────┐           ▼           │
//!   rule-set JSON       │◀────────────────│response │◀──── link renderer    │
//!   ◀───────────────────│                 └─────────┘                       │
//!                       │                                                   │
//!                       │   lifecycle (startup/shutdown) · observability     │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vmess_publisher::config::{ListenerConfig, ObservabilityConfig, ServeConfig, TimeoutConfig, TlsConfig};
use vmess_publisher::lifecycle::{signals, startup, Shutdown};
use vmess_publisher::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "vmess-publisher", version)]
#[command(about = "Publishes per-subscriber VMess server lists and routing rules", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// TLS server cert file (PEM)
    #[arg(long, requires = "key_file")]
    cert_file: Option<PathBuf>,

    /// TLS server key file (PEM)
    #[arg(long, requires = "cert_file")]
    key_file: Option<PathBuf>,

    /// Address the HTTP server listens on
    #[arg(long, default_value = "localhost:3000")]
    address: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn serve_config(&self) -> ServeConfig {
        let tls = match (&self.cert_file, &self.key_file) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            _ => None,
        };

        ServeConfig {
            listener: ListenerConfig {
                bind_address: self.address.clone(),
                tls,
            },
            timeouts: TimeoutConfig {
                request_secs: self.request_timeout_secs,
                ..Default::default()
            },
            observability: ObservabilityConfig {
                log_format: self.log_format,
                metrics_address: self.metrics_address.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.serve_config();
    init_logging(config.observability.log_format);
    startup::log_banner();

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match startup::run(&cli.config, config, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Publisher failed, exiting");
            ExitCode::FAILURE
        }
    }
}
