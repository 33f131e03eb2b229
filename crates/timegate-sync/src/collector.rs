//! HTTP client for the downstream attendance collector.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use timegate_core::{AttendanceRecord, Direction};
use tracing::info;

/// Total request bound for one batch POST. The pipeline awaits the forward
/// inside its cycle, so a hung collector must fail the request, not stall
/// polling.
const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collector returned {status}: {body}")]
    Collector { status: u16, body: String },
}

/// One record in the collector's wire format.
///
/// Identifiers are stringified and timestamps rendered as RFC 3339 because
/// that is what the collector's ingest endpoint expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorRecord {
    pub employee_id: String,
    pub timestamp: String,
    pub device_ip: String,
    pub punch_type: Direction,
    pub name: String,
}

impl From<&AttendanceRecord> for CollectorRecord {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            employee_id: record.device_user_id.clone(),
            timestamp: record.record_time.to_rfc3339(),
            device_ip: record.device_ip.clone(),
            punch_type: record.direction,
            name: record.name.clone(),
        }
    }
}

/// Outcome reported to the pipeline after a forward attempt.
#[derive(Debug, Clone, Copy)]
pub struct ForwardReport {
    pub success: bool,
    pub forwarded: usize,
}

/// Batch POST client for the collector's ingest endpoint.
pub struct ForwardClient {
    client: reqwest::Client,
    base_url: String,
}

impl ForwardClient {
    /// Create a client for the given collector base URL, with the default
    /// request timeout.
    ///
    /// `base_url` should be like `http://collector:8080` (no trailing slash).
    pub fn new(base_url: String) -> Result<Self, ForwardError> {
        Self::with_timeout(base_url, DEFAULT_FORWARD_TIMEOUT)
    }

    /// Create a client with an explicit total request timeout.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Forward a batch of newly accepted records as a single POST.
    ///
    /// An empty batch is a no-op reported as `success: false`. Local
    /// persistence has already committed by the time this runs; a failure
    /// here is the caller's to log and never rolls the store back. Any 2xx
    /// from the collector counts as delivered; there is no automatic retry.
    pub async fn forward(
        &self,
        records: &[AttendanceRecord],
    ) -> Result<ForwardReport, ForwardError> {
        if records.is_empty() {
            return Ok(ForwardReport {
                success: false,
                forwarded: 0,
            });
        }

        let payload: Vec<CollectorRecord> = records.iter().map(CollectorRecord::from).collect();
        let url = format!("{}/api/attendance/batch", self.base_url);

        info!(url = %url, count = payload.len(), "forwarding records to collector");
        let resp = self.client.post(&url).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ForwardError::Collector {
                status: status.as_u16(),
                body,
            });
        }

        info!(count = records.len(), "forward complete");
        Ok(ForwardReport {
            success: true,
            forwarded: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> AttendanceRecord {
        AttendanceRecord {
            device_user_id: "7".into(),
            record_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            device_ip: "10.0.0.1".into(),
            name: "Alice".into(),
            direction: Direction::In,
            serial_number: None,
        }
    }

    #[test]
    fn maps_record_to_collector_schema() {
        let mapped = CollectorRecord::from(&record());
        assert_eq!(mapped.employee_id, "7");
        assert_eq!(mapped.timestamp, "2024-01-01T08:00:00+00:00");
        assert_eq!(mapped.device_ip, "10.0.0.1");
        assert_eq!(mapped.punch_type, Direction::In);
    }

    #[test]
    fn collector_payload_is_camel_case() {
        let json = serde_json::to_value(CollectorRecord::from(&record())).unwrap();
        assert_eq!(json["employeeId"], "7");
        assert_eq!(json["punchType"], "IN");
        assert_eq!(json["deviceIp"], "10.0.0.1");
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let client = ForwardClient::new("http://localhost:1".into()).unwrap();
        let report = client.forward(&[]).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.forwarded, 0);
    }

    #[tokio::test]
    async fn unreachable_collector_is_an_http_error() {
        // Nothing listens on port 1; the transport error must surface as
        // ForwardError::Http, not a panic.
        let client = ForwardClient::new("http://127.0.0.1:1".into()).unwrap();
        let result = client.forward(&[record()]).await;
        assert!(matches!(result, Err(ForwardError::Http(_))));
    }

    #[tokio::test]
    async fn hung_collector_fails_within_the_request_timeout() {
        // A collector that accepts the connection and never answers must not
        // hang the forward: the cycle holding the pipeline lock depends on
        // this call completing.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            ForwardClient::with_timeout(format!("http://{addr}"), Duration::from_millis(200))
                .unwrap();
        let started = std::time::Instant::now();
        let result = client.forward(&[record()]).await;
        assert!(matches!(result, Err(ForwardError::Http(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn forward_client_trims_trailing_slash() {
        let client = ForwardClient::new("http://collector:8080/".into()).unwrap();
        assert_eq!(client.base_url, "http://collector:8080");
    }
}
