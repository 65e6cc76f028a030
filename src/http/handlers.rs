//! Publish endpoint handlers.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /publish/{key}/servers`
pub async fn publish_servers(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let start = Instant::now();
    let res = match state.publisher.server_list(&key) {
        Ok(body) => response::server_list(body),
        Err(e) => e.into_response(),
    };
    metrics::record_request("servers", res.status().as_u16(), start);
    res
}

/// `GET /publish/{key}/routingRules/{rulesID}`
pub async fn publish_routing_rules(
    State(state): State<AppState>,
    Path((key, rules_id)): Path<(String, String)>,
) -> Response {
    let start = Instant::now();
    let res = match state.publisher.routing_rule_set_json(&key, &rules_id) {
        Ok(json) => response::rule_set(json),
        Err(e) => e.into_response(),
    };
    metrics::record_request("routing_rules", res.status().as_u16(), start);
    res
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::schema::{Document, RoutingRule, Subscriber, VmessServer};
    use crate::config::{ServeConfig, Snapshot};
    use crate::http::response::{INTERNAL_ERROR_BODY, NOT_FOUND_BODY};
    use crate::http::server::{AppState, HttpServer};
    use crate::publish::PublishService;

    fn router() -> axum::Router {
        let mut doc = Document::default();
        doc.servers.insert(
            "s1".into(),
            VmessServer {
                address: "example.com".into(),
                ..Default::default()
            },
        );
        doc.rule_sets.insert(
            "r1".into(),
            vec![RoutingRule {
                outbound_tag: "proxy".into(),
                ..Default::default()
            }],
        );
        doc.subscribers.push(Subscriber {
            remarks: "healthy".into(),
            key: "healthyhealthy1".into(),
            vmess_servers: vec!["s1".into()],
            routing_rules: vec!["r1".into()],
        });
        doc.subscribers.push(Subscriber {
            remarks: "broken".into(),
            key: "brokenbroken1".into(),
            vmess_servers: vec!["s1".into(), "ghost".into()],
            routing_rules: vec!["phantom".into()],
        });

        let snapshot = Arc::new(Snapshot::from_document_unchecked(doc));
        let state = AppState {
            publisher: Arc::new(PublishService::new(snapshot)),
        };
        HttpServer::build_router(&ServeConfig::default(), state)
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let res = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_server_discards_partial_output() {
        let (status, body) = get("/publish/brokenbroken1/servers").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_missing_rule_set_is_500() {
        let (status, body) = get("/publish/brokenbroken1/routingRules/phantom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_not_found_paths() {
        for uri in [
            "/publish/nobody/servers",
            "/publish/brokenbroken1/routingRules/r1",
            "/publish/healthyhealthy1/routingRules/s1",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body, NOT_FOUND_BODY, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_healthy_subscriber() {
        let (status, body) = get("/publish/healthyhealthy1/routingRules/r1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"[{"outboundTag":"proxy"}]"#);

        let (status, body) = get("/publish/healthyhealthy1/servers").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_missing_request_id_is_generated() {
        let res = router()
            .oneshot(
                Request::builder()
                    .uri("/publish/healthyhealthy1/servers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let id = res.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }
}
