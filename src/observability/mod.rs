//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Library code (config, publish, http):
//!     → tracing events with structured fields
//!     → logging.rs (subscriber installed once by the binary)
//!
//! HTTP handlers:
//!     → metrics.rs (request counters and latency histograms)
//!     → Prometheus exporter (optional listener)
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber; only main does
//! - Request ID flows through the trace span of every request
//! - Subscriber keys are logged only for rejected lookups

pub mod logging;
pub mod metrics;
