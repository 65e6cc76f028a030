//! Publication subsystem.
//!
//! # Data Flow
//! ```text
//! GET /publish/{key}/servers
//!     → service.rs (key lookup, resolve server ids in order)
//!     → link.rs (vmess:// share link per server)
//!     → base64 body
//!
//! GET /publish/{key}/routingRules/{rulesID}
//!     → service.rs (key lookup, authorization join, rule-set lookup)
//!     → JSON array of rules
//! ```
//!
//! # Design Decisions
//! - Read-only over an immutable snapshot; no locks on the request path
//! - Unknown keys and unauthorized rule sets are indistinguishable (404)
//! - Lookups that validation should have made impossible are internal errors

pub mod link;
pub mod service;

pub use link::{decode_share_link, LinkError, SHARE_LINK_SCHEME};
pub use service::{authorize_rule_set, PublishError, PublishService};
