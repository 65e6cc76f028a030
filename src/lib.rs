//! VMess subscription publisher.
//!
//! Loads an administrator-curated document of VMess servers, routing rule
//! sets and subscribers once at startup, then serves each subscriber their
//! own server list and routing rules over HTTP(S), gated by the key in the
//! URL.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod publish;

pub use config::{load_config, ConfigError, ServeConfig, Snapshot};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use publish::{PublishError, PublishService};
