//! Error telemetry records and the reporter capability.
//!
//! A record is built once per failure and delivered best-effort. Reporters
//! must never block the caller and must never report their own delivery
//! failures, otherwise a dead collector would feed an endless loop.

use crate::ErrorCode;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

/// Host context attached to every record. Field names follow the collector's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostMetadata {
    pub hostname: String,
    pub platform: String,
    pub architecture: String,
    #[serde(rename = "cpus")]
    pub cpu_model: String,
    #[serde(rename = "totalMemory")]
    pub total_memory_gb: f64,
    #[serde(rename = "freeMemory")]
    pub free_memory_gb: f64,
    #[serde(rename = "uptime")]
    pub uptime_hours: f64,
    #[serde(rename = "userInfo")]
    pub username: String,
    #[serde(rename = "nodeVersion")]
    pub runtime_version: String,
}

/// One failure event, as POSTed to the collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub code: u16,
    pub message: String,
    pub stack: Option<String>,
    #[serde(rename = "pcDetails")]
    pub host: HostMetadata,
}

impl ErrorRecord {
    /// Build a record stamped with the current UTC time.
    pub fn new(code: ErrorCode, message: &str, stack: Option<&str>, host: HostMetadata) -> Self {
        Self::at(OffsetDateTime::now_utc(), code, message, stack, host)
    }

    pub fn at(
        when: OffsetDateTime,
        code: ErrorCode,
        message: &str,
        stack: Option<&str>,
        host: HostMetadata,
    ) -> Self {
        let timestamp = when
            .format(&Rfc3339)
            .unwrap_or_else(|_| when.unix_timestamp().to_string());
        Self {
            timestamp,
            code: code.as_u16(),
            message: message.to_string(),
            stack: stack.map(str::to_string),
            host,
        }
    }

    /// Serialize as a single newline-terminated JSON line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Capability for delivering failure records.
pub trait Reporter: Send + Sync {
    /// Hand off one failure. Must return without waiting for delivery.
    fn report(&self, code: ErrorCode, message: &str, stack: Option<&str>);
}

/// Reporter used when telemetry is disabled.
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, code: ErrorCode, message: &str, _stack: Option<&str>) {
        debug!(%code, message, "telemetry disabled, dropping report");
    }
}
