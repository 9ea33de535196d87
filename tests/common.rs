#![allow(dead_code)]

use std::{collections::HashMap, path::Path};

use bytes::Bytes;
use mockall::mock;
use ptch::{
    app::{ContainerEngine, ContainerEngineError, ScanService, ScanServiceError},
    domain::ImageReference,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

mock! {
    pub ContainerEngine {}
    #[async_trait::async_trait]
    impl ContainerEngine for ContainerEngine {
        async fn is_installed(&self) -> bool;
        async fn is_running(&self) -> bool;
        async fn save_image(&self, image: &ImageReference, destination: &Path) -> Result<(), ContainerEngineError>;
        async fn list_images(&self) -> Result<Vec<String>, ContainerEngineError>;
    }
}

mock! {
    pub ScanService {}
    #[async_trait::async_trait]
    impl ScanService for ScanService {
        async fn order_remote_scan(&self, image: &ImageReference) -> Result<String, ScanServiceError>;
        async fn upload_image(&self, tarball: Bytes, image: &ImageReference) -> Result<String, ScanServiceError>;
    }
}

/// An engine that passes both preflight checks.
pub fn ready_engine() -> MockContainerEngine {
    let mut engine = MockContainerEngine::new();
    engine.expect_is_installed().times(1).returning(|| true);
    engine.expect_is_running().times(1).returning(|| true);
    engine
}

pub fn engine_error(message: &str) -> ContainerEngineError {
    ContainerEngineError::ContainerEngineError(message.to_string().into())
}

pub fn scan_service_error(message: &str) -> ScanServiceError {
    ScanServiceError::ScanServiceError(message.to_string().into())
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Accepts a single HTTP/1.1 connection, records the request and answers with
/// a canned response.
pub struct OneShotServer {
    pub base_url: String,
    handle: JoinHandle<RecordedRequest>,
}

impl OneShotServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason_phrase(status),
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 8192];

            let header_end = loop {
                let read = socket.read(&mut chunk).await.unwrap();
                assert!(read > 0, "connection closed before the request head");
                buffer.extend_from_slice(&chunk[..read]);
                if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let mut lines = head.split("\r\n");
            let mut request_line = lines.next().unwrap_or_default().split(' ');
            let method = request_line.next().unwrap_or_default().to_string();
            let path = request_line.next().unwrap_or_default().to_string();
            let headers = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
                .collect::<HashMap<_, _>>();

            let content_length = headers
                .get("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = buffer[header_end..].to_vec();
            while body.len() < content_length {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..read]);
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            RecordedRequest {
                method,
                path,
                headers,
                body,
            }
        });

        Self { base_url, handle }
    }

    pub async fn received(self) -> RecordedRequest {
        self.handle.await.unwrap()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

/// A local address nobody listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
