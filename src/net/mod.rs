//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! --address flag
//!     → listener.rs (resolve host name, bind)
//!     → tls.rs (optional rustls config from PEM files)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; plain HTTP is allowed but warned about at startup

pub mod listener;
pub mod tls;
