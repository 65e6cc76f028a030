//! Credential-gated lookups over a [`Snapshot`].
//!
//! Every operation starts with a subscriber-key lookup. Unknown keys and
//! unauthorized rule sets both come back as [`PublishError::NotFound`], so a
//! caller learns nothing about what exists. Ids the subscriber references
//! but the snapshot cannot resolve are index bugs, reported as internal
//! errors and logged at error level.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::Span;

use crate::config::schema::{RuleSet, Subscriber};
use crate::config::snapshot::Snapshot;
use crate::publish::link::LinkError;

/// Outcome of a failed publish request.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Unknown key, or a rule set the subscriber may not read.
    #[error("not found")]
    NotFound,

    #[error("subscriber ({subscriber}) wants VMess server ({server_id}), but it is not indexed")]
    MissingServer {
        subscriber: String,
        server_id: String,
    },

    #[error("subscriber ({subscriber}) wants routing rule set ({rule_set_id}), but it is not indexed")]
    MissingRuleSet {
        subscriber: String,
        rule_set_id: String,
    },

    #[error("failed to render VMess server ({server_id}): {source}")]
    Render {
        server_id: String,
        #[source]
        source: LinkError,
    },

    #[error("failed to encode routing rule set ({rule_set_id}): {source}")]
    EncodeRuleSet {
        rule_set_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PublishError {
    /// True for failures that point at a server-side bug rather than the caller.
    pub fn is_internal(&self) -> bool {
        !matches!(self, PublishError::NotFound)
    }
}

/// Whether `subscriber` may read the rule set `rule_set_id`.
pub fn authorize_rule_set(subscriber: &Subscriber, rule_set_id: &str) -> bool {
    subscriber.routing_rules.iter().any(|id| id == rule_set_id)
}

/// Answers subscription requests from one immutable snapshot.
#[derive(Debug, Clone)]
pub struct PublishService {
    snapshot: Arc<Snapshot>,
    span: Span,
}

impl PublishService {
    /// Create a service logging under a `publisher` span.
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self::with_span(snapshot, tracing::info_span!("publisher"))
    }

    /// Create a service whose events are recorded inside `span`.
    pub fn with_span(snapshot: Arc<Snapshot>, span: Span) -> Self {
        Self { snapshot, span }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Build the subscription body for `key`.
    ///
    /// The body is the base64 of every share link followed by `\n`, in the
    /// subscriber's order. The links are collected in a local buffer and
    /// only encoded once every server resolved and rendered.
    pub fn server_list(&self, key: &str) -> Result<Vec<u8>, PublishError> {
        let _entered = self.span.enter();
        let subscriber = self.subscriber(key)?;

        let mut links = Vec::new();
        for server_id in &subscriber.vmess_servers {
            let server = self.snapshot.server(server_id).ok_or_else(|| {
                tracing::error!(
                    subscriber = %subscriber.remarks,
                    server_id = %server_id,
                    "VMess server referenced by subscriber is not indexed"
                );
                PublishError::MissingServer {
                    subscriber: subscriber.remarks.clone(),
                    server_id: server_id.clone(),
                }
            })?;

            server
                .write_share_link(&mut links)
                .map_err(|source| render_failed(server_id, source))?;
            links.push(b'\n');
        }

        tracing::debug!(
            subscriber = %subscriber.remarks,
            servers = subscriber.vmess_servers.len(),
            "Published server list"
        );
        Ok(STANDARD.encode(&links).into_bytes())
    }

    /// Look up a rule set the subscriber is allowed to read.
    pub fn routing_rule_set(&self, key: &str, rule_set_id: &str) -> Result<&RuleSet, PublishError> {
        let _entered = self.span.enter();
        let subscriber = self.subscriber(key)?;

        if !authorize_rule_set(subscriber, rule_set_id) {
            tracing::warn!(
                subscriber = %subscriber.remarks,
                rule_set_id = %rule_set_id,
                "Routing rule set not allowed for subscriber, responding not found"
            );
            return Err(PublishError::NotFound);
        }

        self.snapshot.rule_set(rule_set_id).ok_or_else(|| {
            tracing::error!(
                subscriber = %subscriber.remarks,
                rule_set_id = %rule_set_id,
                "Routing rule set referenced by subscriber is not indexed"
            );
            PublishError::MissingRuleSet {
                subscriber: subscriber.remarks.clone(),
                rule_set_id: rule_set_id.to_string(),
            }
        })
    }

    /// [`Self::routing_rule_set`] encoded as a JSON array.
    pub fn routing_rule_set_json(&self, key: &str, rule_set_id: &str) -> Result<Vec<u8>, PublishError> {
        let rules = self.routing_rule_set(key, rule_set_id)?;
        serde_json::to_vec(rules).map_err(|source| {
            let _entered = self.span.enter();
            tracing::error!(rule_set_id = %rule_set_id, error = %source, "Failed to encode routing rule set");
            PublishError::EncodeRuleSet {
                rule_set_id: rule_set_id.to_string(),
                source,
            }
        })
    }

    fn subscriber(&self, key: &str) -> Result<&Subscriber, PublishError> {
        self.snapshot.subscriber(key).ok_or_else(|| {
            tracing::warn!(key = %key, "Invalid key received, responding not found");
            PublishError::NotFound
        })
    }
}

fn render_failed(server_id: &str, source: LinkError) -> PublishError {
    tracing::error!(server_id = %server_id, error = %source, "Failed to render VMess server");
    PublishError::Render {
        server_id: server_id.to_string(),
        source,
    }
}
