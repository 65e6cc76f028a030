//! Mapping publish outcomes to HTTP responses.
//!
//! # Design Decisions
//! - Not-found responses carry a fixed body with no detail, whatever the cause
//! - Internal errors carry a fixed body; the detail goes to the error log only

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::publish::PublishError;

/// Body of every 404.
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Body of every 500.
pub const INTERNAL_ERROR_BODY: &str = "Server Internal Error, Please tell the administrator.";

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
        } else {
            (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
        }
    }
}

/// A successful subscription body.
pub fn server_list(body: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// A successful rule-set document.
pub fn rule_set(json: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], json).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PublishError::NotFound.into_response().status(), StatusCode::NOT_FOUND);

        let err = PublishError::MissingServer {
            subscriber: "alice".into(),
            server_id: "s9".into(),
        };
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_content_types() {
        let res = server_list(b"dm1lc3M6Ly8K".to_vec());
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");

        let res = rule_set(b"[]".to_vec());
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }
}
