//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use vmess_publisher::config::{load_str, ServeConfig};
use vmess_publisher::{HttpServer, Shutdown};

/// The scenario used across the endpoint tests: one server, one rule set,
/// one subscriber allowed both.
pub const ALICE_CONFIG: &str = r#"{
    "publisher": {"name": "test publisher"},
    "vmessServers": {
        "s1": {"address": "example.com", "port": "443", "id": "uuid-1", "network": "ws", "streamSecurity": "tls"}
    },
    "routingRules": {
        "r1": [{"outboundTag": "proxy"}],
        "r2": [{"domain": ["geosite:cn"], "outboundTag": "direct"}]
    },
    "subscribers": [
        {"remarks": "alice", "key": "abcdefghij0123", "vmessServers": ["s1"], "routingRules": ["r1"]}
    ]
}"#;

/// A running publisher bound to an ephemeral port.
pub struct TestPublisher {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestPublisher {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestPublisher {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Load `config` and serve it on 127.0.0.1 with a random port.
pub async fn start_publisher(config: &str) -> TestPublisher {
    let snapshot = Arc::new(load_str(config).expect("test config must load"));
    let server = HttpServer::new(snapshot, ServeConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // The listener is already bound; give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestPublisher { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
