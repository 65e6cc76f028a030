//! Configuration loading from disk.
//!
//! The top-level object is read one key at a time, in document order. Each
//! recognized section is deserialized as it is reached; the first key that
//! is not a known section stops parsing and is reported by name. A section
//! that appears twice is a parse error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use thiserror::Error;

use crate::config::schema::Document;
use crate::config::snapshot::Snapshot;
use crate::config::validation::ValidationError;

/// Top-level sections of the subscription document.
pub const SECTIONS: &[&str] = &["publisher", "vmessServers", "routingRules", "subscribers"];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse config: unknown config field '{field}'")]
    UnknownField { field: String },

    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
}

/// Load, validate and index a configuration file.
pub fn load_config(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    });
    let snapshot = content.and_then(|content| load_str(&content));

    match &snapshot {
        Ok(snapshot) => tracing::info!(
            path = %path.display(),
            servers = snapshot.server_count(),
            rule_sets = snapshot.rule_set_count(),
            subscribers = snapshot.subscribers().len(),
            "Configuration loaded"
        ),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to load configuration"),
    }

    snapshot
}

/// Parse, validate and index a configuration held in memory.
pub fn load_str(json: &str) -> Result<Snapshot, ConfigError> {
    let doc = parse_document(json)?;
    Ok(Snapshot::from_document(doc)?)
}

/// Parse the document without cross-checking it.
pub fn parse_document(json: &str) -> Result<Document, ConfigError> {
    let mut unknown = None;
    let mut de = serde_json::Deserializer::from_str(json);

    let parsed = (&mut de).deserialize_map(DocumentVisitor {
        unknown: &mut unknown,
    });

    match parsed {
        Ok(doc) => {
            de.end()?;
            Ok(doc)
        }
        Err(e) => match unknown {
            Some(field) => Err(ConfigError::UnknownField { field }),
            None => Err(ConfigError::Parse(e)),
        },
    }
}

/// Walks the top-level object, recording the first unknown key it meets.
struct DocumentVisitor<'a> {
    unknown: &'a mut Option<String>,
}

impl<'de, 'a> Visitor<'de> for DocumentVisitor<'a> {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a publisher configuration object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Document, A::Error> {
        let mut doc = Document::default();
        let mut seen = [false; SECTIONS.len()];

        while let Some(field) = map.next_key::<String>()? {
            let Some(index) = SECTIONS.iter().position(|s| *s == field) else {
                let err = <A::Error as de::Error>::unknown_field(&field, SECTIONS);
                *self.unknown = Some(field);
                return Err(err);
            };
            if std::mem::replace(&mut seen[index], true) {
                return Err(<A::Error as de::Error>::duplicate_field(SECTIONS[index]));
            }

            match SECTIONS[index] {
                "vmessServers" => doc.servers = map.next_value()?,
                "routingRules" => doc.rule_sets = map.next_value()?,
                "subscribers" => doc.subscribers = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "publisher": {"name": "ignored", "nested": [1, 2, {"x": null}]},
        "vmessServers": {
            "s1": {"address": "example.com", "port": "443", "id": "uuid-1", "network": "ws", "streamSecurity": "tls"}
        },
        "routingRules": {
            "r1": [{"domain": ["geosite:google"], "outboundTag": "proxy"}]
        },
        "subscribers": [
            {"remarks": "alice", "key": "abcdefghij0123", "vmessServers": ["s1"], "routingRules": ["r1"]}
        ]
    }"#;

    #[test]
    fn test_load_valid_document() {
        let snapshot = load_str(VALID).unwrap();
        assert_eq!(snapshot.server("s1").unwrap().address, "example.com");
        assert_eq!(snapshot.rule_set("r1").unwrap()[0].outbound_tag, "proxy");
        assert_eq!(snapshot.subscriber("abcdefghij0123").unwrap().remarks, "alice");
    }

    #[test]
    fn test_sections_in_any_order() {
        let json = r#"{
            "subscribers": [{"remarks": "a", "key": "abcdefghij0123", "vmessServers": ["s1"]}],
            "vmessServers": {"s1": {"address": "x"}}
        }"#;
        let snapshot = load_str(json).unwrap();
        assert_eq!(snapshot.server_count(), 1);
        assert_eq!(snapshot.rule_set_count(), 0);
    }

    #[test]
    fn test_empty_object() {
        let snapshot = load_str("{}").unwrap();
        assert!(snapshot.subscribers().is_empty());
    }

    #[test]
    fn test_unknown_top_level_field() {
        let json = r#"{"vmessServers": {}, "extra": 1, "alsoExtra": 2}"#;
        match load_str(json) {
            Err(ConfigError::UnknownField { field }) => assert_eq!(field, "extra"),
            other => panic!("expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_nested_field_is_parse_error() {
        let json = r#"{"vmessServers": {"s1": {"address": "x", "bogus": "y"}}}"#;
        assert!(matches!(load_str(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_repeated_section_rejected() {
        let json = r#"{
            "vmessServers": {"s1": {"address": "example.com"}},
            "subscribers": [{"remarks": "alice", "key": "abcdefghij0123", "vmessServers": ["s1"]}],
            "subscribers": [{"remarks": "bob", "key": "bobbobbob0123"}]
        }"#;
        let err = load_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{:?}", err);
        assert!(err.to_string().contains("duplicate field `subscribers`"), "{}", err);

        let json = r#"{"vmessServers": {"s1": {}}, "vmessServers": {"s2": {}}}"#;
        assert!(matches!(load_str(json), Err(ConfigError::Parse(_))));

        let json = r#"{"publisher": {}, "publisher": {}}"#;
        assert!(matches!(load_str(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(load_str(r#"{"vmessServers": "#), Err(ConfigError::Parse(_))));
        assert!(matches!(load_str("[]"), Err(ConfigError::Parse(_))));
        assert!(matches!(load_str("{} trailing"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let json = r#"{"subscribers": [{"remarks": "a", "key": "abcdefghij0123", "vmessServers": ["missing"]}]}"#;
        assert!(matches!(
            load_str(json),
            Err(ConfigError::Validation(ValidationError::DanglingServerReference { .. }))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let snapshot = load_config(file.path()).unwrap();
        assert_eq!(snapshot.subscribers().len(), 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        match load_config(&path) {
            Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
