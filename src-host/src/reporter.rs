//! HTTP delivery of error records.

use crate::config::TelemetryConfig;
use deskrelay_core::{ErrorCode, ErrorRecord, HostMetadata, Reporter};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::runtime::Handle;

/// Source of host metadata, sampled once per report.
pub type MetadataSource = fn() -> HostMetadata;

/// Reporter that POSTs one JSON line per failure to the collector.
///
/// Delivery runs on a spawned task; the caller never waits. Delivery failures
/// are logged and dropped, never reported again.
pub struct HttpReporter {
    client: Client,
    endpoint: String,
    runtime: Handle,
    metadata: MetadataSource,
}

impl HttpReporter {
    pub fn new(
        config: &TelemetryConfig,
        runtime: Handle,
        metadata: MetadataSource,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            runtime,
            metadata,
        })
    }
}

/// POST one record; returns the collector's status.
pub async fn deliver(
    client: &Client,
    endpoint: &str,
    record: &ErrorRecord,
) -> anyhow::Result<StatusCode> {
    let body = record.to_line()?;
    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;
    Ok(response.status())
}

impl Reporter for HttpReporter {
    fn report(&self, code: ErrorCode, message: &str, stack: Option<&str>) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let metadata = self.metadata;
        let message = message.to_string();
        let stack = stack.map(str::to_string);

        self.runtime.spawn(async move {
            let host = match tokio::task::spawn_blocking(metadata).await {
                Ok(host) => host,
                Err(e) => {
                    tracing::warn!("Host metadata collection failed: {}", e);
                    return;
                }
            };
            let record = ErrorRecord::new(code, &message, stack.as_deref(), host);
            log_delivery(code, deliver(&client, &endpoint, &record).await);
        });
    }
}

/// Log the delivery result; returns whether the collector accepted the record.
fn log_delivery(code: ErrorCode, result: anyhow::Result<StatusCode>) -> bool {
    match result {
        Ok(status) if status.is_success() => {
            tracing::debug!(code = %code, %status, "Error report delivered");
            true
        }
        Ok(status) => {
            tracing::warn!(code = %code, "Collector returned non-success status: {}", status);
            false
        }
        Err(e) => {
            tracing::warn!(code = %code, "Failed to deliver error report: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn fixed_metadata() -> HostMetadata {
        HostMetadata {
            hostname: "test-host".into(),
            platform: "linux".into(),
            architecture: "x86_64".into(),
            cpu_model: "Test CPU".into(),
            total_memory_gb: 8.0,
            free_memory_gb: 2.0,
            uptime_hours: 1.5,
            username: "tester".into(),
            runtime_version: "0.1.0".into(),
        }
    }

    /// Accept one HTTP request, answer 200 and hand back the body.
    async fn collector() -> (String, oneshot::Receiver<String>) {
        collector_answering("200 OK").await
    }

    /// Accept one HTTP request, answer with `status` and hand back the body.
    async fn collector_answering(status: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break String::new();
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let headers = text[..split].to_ascii_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    let body = &text[split + 4..];
                    if body.len() >= length {
                        break body.to_string();
                    }
                }
            };
            socket
                .write_all(
                    format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                        .as_bytes(),
                )
                .await
                .unwrap();
            let _ = tx.send(body);
        });

        (format!("http://{addr}/log"), rx)
    }

    #[tokio::test]
    async fn test_deliver_posts_json_line() {
        let (endpoint, body) = collector().await;
        let record = ErrorRecord::new(
            ErrorCode::MouseMove,
            "Failed to move mouse: injection failed: busy",
            None,
            fixed_metadata(),
        );

        let status = deliver(&Client::new(), &endpoint, &record).await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let body = body.await.unwrap();
        assert!(body.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
        assert_eq!(value["code"], 1003);
        assert_eq!(value["pcDetails"]["hostname"], "test-host");
    }

    #[tokio::test]
    async fn test_report_does_not_block_and_delivers() {
        let (endpoint, body) = collector().await;
        let config = TelemetryConfig {
            endpoint,
            ..Default::default()
        };
        let reporter = HttpReporter::new(&config, Handle::current(), fixed_metadata).unwrap();

        reporter.report(
            ErrorCode::Screenshot,
            "Failed to capture screenshot",
            Some("caused by: capture failed"),
        );

        let body = tokio::time::timeout(Duration::from_secs(5), body)
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
        assert_eq!(value["code"], 1002);
        assert_eq!(value["stack"], "caused by: capture failed");
    }

    #[tokio::test]
    async fn test_unreachable_collector_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let record = ErrorRecord::new(ErrorCode::OsInfo, "x", None, fixed_metadata());
        let result = deliver(&client, &format!("http://{addr}/log"), &record).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejected_report_is_not_counted_as_delivered() {
        let (endpoint, body) = collector_answering("500 Internal Server Error").await;
        let record = ErrorRecord::new(ErrorCode::KeyPress, "x", None, fixed_metadata());

        let result = deliver(&Client::new(), &endpoint, &record).await;
        assert!(matches!(result, Ok(StatusCode::INTERNAL_SERVER_ERROR)));
        assert!(!body.await.unwrap().is_empty());

        assert!(!log_delivery(ErrorCode::KeyPress, result));
        assert!(log_delivery(ErrorCode::KeyPress, Ok(StatusCode::NO_CONTENT)));
        assert!(!log_delivery(ErrorCode::KeyPress, Err(anyhow::anyhow!("timed out"))));
    }
}
