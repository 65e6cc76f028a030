//! Configuration schema definitions.
//!
//! Entity types read from the subscription document. Field names on the
//! config side use the document's camelCase keys; the share-link side of
//! [`VmessServer`] uses the abbreviated keys v2rayN expects, which is why
//! that type has its own `Serialize` impl instead of a derive.

use std::collections::HashMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The parsed subscription document, before any cross-checking.
///
/// Built by [`crate::config::loader`] one top-level section at a time; the
/// `publisher` section is skipped and never stored.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// `vmessServers`: server id to server.
    pub servers: HashMap<String, VmessServer>,

    /// `routingRules`: rule-set id to its ordered rules.
    pub rule_sets: HashMap<String, RuleSet>,

    /// `subscribers`, in document order.
    pub subscribers: Vec<Subscriber>,
}

/// A VMess server as understood by v2rayN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct VmessServer {
    /// Share-link format version, used by v2rayN to identify the link layout.
    pub config_version: String,

    /// Server alias shown in the client.
    pub remarks: String,

    /// Server address.
    pub address: String,

    /// Server port.
    pub port: String,

    /// User id (UUID) on the server.
    pub id: String,

    /// User alterId.
    pub alter_id: String,

    /// Underlying transport, e.g. tcp, kcp, ws, h2, quic.
    pub network: String,

    /// Masquerade header type, e.g. none, http, srtp, utp, wechat-video.
    pub header_type: String,

    /// Masquerade host of the underlying transport.
    pub request_host: String,

    /// ws path, h2 path or QUIC key / kcp seed.
    pub path: String,

    /// Transport layer security, e.g. tls.
    pub stream_security: String,

    /// SNI sent when TLS is enabled.
    pub sni: String,
}

/// Serializes with the abbreviated share-link keys, in fixed order.
impl Serialize for VmessServer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut link = serializer.serialize_struct("VmessServer", 12)?;
        link.serialize_field("v", &self.config_version)?;
        link.serialize_field("ps", &self.remarks)?;
        link.serialize_field("add", &self.address)?;
        link.serialize_field("port", &self.port)?;
        link.serialize_field("id", &self.id)?;
        link.serialize_field("aid", &self.alter_id)?;
        link.serialize_field("net", &self.network)?;
        link.serialize_field("type", &self.header_type)?;
        link.serialize_field("host", &self.request_host)?;
        link.serialize_field("path", &self.path)?;
        link.serialize_field("tls", &self.stream_security)?;
        link.serialize_field("sni", &self.sni)?;
        link.end()
    }
}

/// A single routing rule supported by v2rayN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RoutingRule {
    /// Domain match patterns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,

    /// IP / CIDR match patterns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,

    /// Port expression, e.g. `80`, `443`, `1000-2000`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,

    /// Protocol matchers, e.g. http, tls, bittorrent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,

    /// Outbound the matched traffic goes to, e.g. direct, proxy, block.
    pub outbound_tag: String,
}

/// A named, ordered list of routing rules.
pub type RuleSet = Vec<RoutingRule>;

/// A user who pulls subscriptions from the publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Subscriber {
    /// Free-text alias, used in logs.
    pub remarks: String,

    /// Capability token: 10-32 ASCII alphanumeric characters, unique.
    pub key: String,

    /// Server ids this subscriber receives, in output order.
    pub vmess_servers: Vec<String>,

    /// Rule-set ids this subscriber may fetch.
    pub routing_rules: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_reads_config_keys() {
        let server: VmessServer = serde_json::from_str(
            r#"{"address": "example.com", "port": "443", "alterId": "0", "streamSecurity": "tls"}"#,
        )
        .unwrap();

        assert_eq!(server.address, "example.com");
        assert_eq!(server.alter_id, "0");
        assert_eq!(server.stream_security, "tls");
        assert_eq!(server.sni, "");
    }

    #[test]
    fn test_server_rejects_unknown_field() {
        let res = serde_json::from_str::<VmessServer>(r#"{"address": "a", "bogus": "b"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_server_serializes_abbreviated_keys_in_order() {
        let server = VmessServer {
            address: "example.com".into(),
            port: "443".into(),
            id: "uuid-1".into(),
            network: "ws".into(),
            stream_security: "tls".into(),
            ..Default::default()
        };

        let json = serde_json::to_string(&server).unwrap();
        assert_eq!(
            json,
            r#"{"v":"","ps":"","add":"example.com","port":"443","id":"uuid-1","aid":"","net":"ws","type":"","host":"","path":"","tls":"tls","sni":""}"#
        );
    }

    #[test]
    fn test_rule_omits_empty_fields() {
        let rule = RoutingRule {
            outbound_tag: "proxy".into(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&rule).unwrap(), r#"{"outboundTag":"proxy"}"#);

        let rule = RoutingRule {
            domain: vec!["geosite:cn".into()],
            port: "1000-2000".into(),
            outbound_tag: "direct".into(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&rule).unwrap(),
            r#"{"domain":["geosite:cn"],"port":"1000-2000","outboundTag":"direct"}"#
        );
    }

    #[test]
    fn test_subscriber_defaults_missing_lists() {
        let sub: Subscriber =
            serde_json::from_str(r#"{"remarks": "alice", "key": "abcdefghij0123"}"#).unwrap();
        assert!(sub.vmess_servers.is_empty());
        assert!(sub.routing_rules.is_empty());
    }
}
