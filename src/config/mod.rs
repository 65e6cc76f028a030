//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON)
//!     → loader.rs (field-by-field parse into Document)
//!     → validation.rs (key shape, references, duplicate keys)
//!     → Snapshot (validated, immutable)
//!     → shared via Arc with the publication service
//!
//! CLI flags
//!     → settings.rs (ServeConfig: listener, timeouts, observability)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no reload path
//! - A document is accepted whole or rejected; no partial snapshot escapes
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod settings;
pub mod snapshot;
pub mod validation;

pub use loader::{load_config, load_str, ConfigError};
pub use schema::{Document, RoutingRule, RuleSet, Subscriber, VmessServer};
pub use settings::{ListenerConfig, ObservabilityConfig, ServeConfig, TimeoutConfig, TlsConfig};
pub use snapshot::Snapshot;
pub use validation::ValidationError;
