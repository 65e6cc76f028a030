//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins; otherwise `DEBUG=1` selects debug level, else info

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "vmess_publisher=debug,tower_http=debug"
    } else {
        "vmess_publisher=info,tower_http=info"
    }
}

/// Whether a `DEBUG` value asks for debug logging. Only `1` does.
pub fn debug_requested(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Install the global tracing subscriber. Call once, from main.
pub fn init_logging(format: LogFormat) {
    let debug = debug_requested(std::env::var("DEBUG").ok().as_deref());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
