use docchat::config::ClientConfig;
use docchat::relay::{self, RelayState};
use serde_json::json;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_document(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let doc_path = temp_dir.path().join("document.txt");
    fs::write(&doc_path, contents).expect("failed to write document");
    (temp_dir, doc_path)
}

/// A relay bound to an ephemeral port
#[allow(dead_code)]
pub struct RunningRelay {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl RunningRelay {
    pub fn base_url(&self) -> String {
        format!("http://{}/api/ollama", self.addr)
    }

    pub async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.expect("relay task panicked")
    }
}

#[allow(dead_code)]
pub async fn start_relay(upstream: &str) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind relay listener");
    let addr = listener.local_addr().expect("no local addr");
    let state = Arc::new(RelayState::new(upstream).expect("failed to create relay state"));
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(relay::serve(listener, state, async move {
        let _ = rx.await;
    }));
    RunningRelay {
        addr,
        shutdown: Some(tx),
        handle,
    }
}

/// Upstream that answers like a running Ollama server
#[allow(dead_code)]
pub async fn fake_ollama() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "llama3.2", "modified_at": "2024-05-01T10:00:00Z", "size": 2019393189u64},
                {"name": "mistral", "modified_at": "2024-04-01T10:00:00Z", "size": 4113301824u64}
            ]
        })))
        .mount(&server)
        .await;
    server
}

/// Client settings pointing at `relay_url`, with a short probe timeout
#[allow(dead_code)]
pub fn client_config(relay_url: &str, upstream_url: &str) -> ClientConfig {
    ClientConfig {
        relay_url: relay_url.to_string(),
        fallback_relay_url: None,
        upstream_url: upstream_url.to_string(),
        request_timeout_seconds: 5,
        probe_timeout_ms: 1000,
        ambiguous_errors_reachable: false,
        ..ClientConfig::default()
    }
}
