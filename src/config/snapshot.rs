//! The validated, immutable configuration served to subscribers.

use std::collections::HashMap;

use crate::config::schema::{Document, RuleSet, Subscriber, VmessServer};
use crate::config::validation::{validate_document, ValidationError};

/// A fully validated configuration.
///
/// Holds three independent keyed containers (servers by id, rule sets by id,
/// subscribers by key). Nothing is mutated after construction, so a
/// `Snapshot` behind an `Arc` is read concurrently without locks.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    servers: HashMap<String, VmessServer>,
    rule_sets: HashMap<String, RuleSet>,
    subscribers: Vec<Subscriber>,
    subscriber_index: HashMap<String, usize>,
}

impl Snapshot {
    /// Validate a parsed document and index it.
    ///
    /// Either the whole document is accepted or an error is returned; no
    /// partially indexed snapshot is ever produced.
    pub fn from_document(doc: Document) -> Result<Self, ValidationError> {
        let subscriber_index = validate_document(&doc)?;
        Ok(Self {
            servers: doc.servers,
            rule_sets: doc.rule_sets,
            subscribers: doc.subscribers,
            subscriber_index,
        })
    }

    /// Look up a server by id.
    pub fn server(&self, id: &str) -> Option<&VmessServer> {
        self.servers.get(id)
    }

    /// Look up a rule set by id.
    pub fn rule_set(&self, id: &str) -> Option<&RuleSet> {
        self.rule_sets.get(id)
    }

    /// Look up a subscriber by key.
    pub fn subscriber(&self, key: &str) -> Option<&Subscriber> {
        self.subscriber_index
            .get(key)
            .and_then(|&pos| self.subscribers.get(pos))
    }

    /// All subscribers, in document order.
    pub fn subscribers(&self) -> &[Subscriber] {
        &self.subscribers
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn rule_set_count(&self) -> usize {
        self.rule_sets.len()
    }

    /// Index a document without validating it.
    ///
    /// Lets tests build the inconsistent states the loader rejects, to
    /// exercise the request-time invariant checks.
    #[cfg(test)]
    pub(crate) fn from_document_unchecked(doc: Document) -> Self {
        let subscriber_index = doc
            .subscribers
            .iter()
            .enumerate()
            .map(|(pos, s)| (s.key.clone(), pos))
            .collect();
        Self {
            servers: doc.servers,
            rule_sets: doc.rule_sets,
            subscribers: doc.subscribers,
            subscriber_index,
        }
    }
}
