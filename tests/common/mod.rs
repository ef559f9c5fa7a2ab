//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

use top_ping::config::{AppConfig, Profile};
use top_ping::observability::LogSink;

/// Config writing logs under `dir`, skipping `/health`, masking `password`.
pub fn test_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.application.profile = Profile::Test;
    config.server.host = "127.0.0.1".into();
    config.logging.dir = dir.to_path_buf();
    config.logging.level = "debug".into();
    config.logging.skip_paths = vec!["^/health".into()];
    config.logging.skip_fields = vec!["password".into()];
    config.logging.desensitize = true;
    config
}

/// A log sink in a temp dir, installed as this thread's default subscriber
/// for as long as the value lives.
pub struct TestSink {
    pub dir: TempDir,
    pub config: AppConfig,
    pub sink: Arc<LogSink>,
    _guard: DefaultGuard,
}

impl TestSink {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let sink = Arc::new(LogSink::new(&config.logging, config.application.profile).unwrap());
        let subscriber = tracing_subscriber::registry().with(sink.layer());
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            dir,
            config,
            sink,
            _guard: guard,
        }
    }

    pub fn general(&self) -> Vec<Value> {
        read_records(&self.sink.default_path())
    }

    pub fn errors(&self) -> Vec<Value> {
        read_records(&self.sink.error_path())
    }

    /// General records with the given message.
    pub fn records(&self, message: &str) -> Vec<Value> {
        self.general()
            .into_iter()
            .filter(|r| r["message"] == message)
            .collect()
    }
}

/// Parse a JSON-lines log file; a missing file reads as empty.
pub fn read_records(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Start a one-shot backend that answers `200 OK` with `response` and hands
/// back the raw request head it received.
pub async fn start_mock_backend(response: &'static str) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read += n,
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&buf[..read]).into_owned());

            let response_str = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.len(),
                response
            );
            let _ = socket.write_all(response_str.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, rx)
}
