//! Request ID handling.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An ID supplied by the client (or a fronting proxy) is kept as is
//! - Missing IDs are filled with a UUID v4 by tower-http's `MakeRequestUuid`

use axum::http::{HeaderName, Request};

/// Header carrying the request ID, in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Read the request ID header, if set.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
