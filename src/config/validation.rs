//! Configuration validation.
//!
//! # Responsibilities
//! - Check subscriber key shape (length and charset)
//! - Check referential integrity (subscribers reference existing servers and rule sets)
//! - Detect duplicate subscriber keys while building the key index
//!
//! # Design Decisions
//! - Stops at the first error; checks run in a fixed order so the same
//!   document always reports the same error
//! - Per subscriber, in document order: key shape, server references,
//!   rule-set references. Duplicate keys are detected in a second pass.
//! - Server ids and rule-set ids are separate namespaces

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{Document, Subscriber};

/// Minimum subscriber key length, in characters.
pub const MIN_KEY_LEN: usize = 10;

/// Maximum subscriber key length, in characters.
pub const MAX_KEY_LEN: usize = 32;

/// A semantic problem in an otherwise well-formed document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The key itself is not echoed, only its length.
    #[error("subscriber ({remarks}) has an invalid key ({key_len} chars): keys must be 10-32 alphanumeric characters")]
    InvalidSubscriberKey { remarks: String, key_len: usize },

    #[error("subscriber ({subscriber}) wants VMess server ({server_id}), but it is not defined")]
    DanglingServerReference {
        subscriber: String,
        server_id: String,
    },

    #[error("subscriber ({subscriber}) wants routing rule set ({rule_set_id}), but it is not defined")]
    DanglingRuleSetReference {
        subscriber: String,
        rule_set_id: String,
    },

    #[error("duplicate subscriber key ({key}) found, which is not allowed")]
    DuplicateSubscriberKey { key: String },
}

/// Returns true if `key` is 10-32 ASCII letters or digits.
pub fn is_valid_subscriber_key(key: &str) -> bool {
    let len = key.chars().count();
    (MIN_KEY_LEN..=MAX_KEY_LEN).contains(&len) && key.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Check the subscriber's key shape.
pub fn validate_subscriber_key(subscriber: &Subscriber) -> Result<(), ValidationError> {
    if is_valid_subscriber_key(&subscriber.key) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSubscriberKey {
            remarks: subscriber.remarks.clone(),
            key_len: subscriber.key.chars().count(),
        })
    }
}

/// Check that every id the subscriber references is defined in the document.
pub fn validate_references(subscriber: &Subscriber, doc: &Document) -> Result<(), ValidationError> {
    if let Some(missing) = subscriber
        .vmess_servers
        .iter()
        .find(|id| !doc.servers.contains_key(id.as_str()))
    {
        return Err(ValidationError::DanglingServerReference {
            subscriber: subscriber.remarks.clone(),
            server_id: missing.clone(),
        });
    }

    if let Some(missing) = subscriber
        .routing_rules
        .iter()
        .find(|id| !doc.rule_sets.contains_key(id.as_str()))
    {
        return Err(ValidationError::DanglingRuleSetReference {
            subscriber: subscriber.remarks.clone(),
            rule_set_id: missing.clone(),
        });
    }

    Ok(())
}

/// Build the key → position index, failing on the second occurrence of a key.
pub fn build_subscriber_index(
    subscribers: &[Subscriber],
) -> Result<HashMap<String, usize>, ValidationError> {
    let mut index = HashMap::with_capacity(subscribers.len());
    for (pos, subscriber) in subscribers.iter().enumerate() {
        if index.insert(subscriber.key.clone(), pos).is_some() {
            return Err(ValidationError::DuplicateSubscriberKey {
                key: subscriber.key.clone(),
            });
        }
    }
    Ok(index)
}

/// Validate a parsed document and return its subscriber index.
pub fn validate_document(doc: &Document) -> Result<HashMap<String, usize>, ValidationError> {
    for subscriber in &doc.subscribers {
        validate_subscriber_key(subscriber)?;
        validate_references(subscriber, doc)?;
    }
    build_subscriber_index(&doc.subscribers)
}
