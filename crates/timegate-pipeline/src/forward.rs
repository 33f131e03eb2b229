//! Seam between the pipeline and the collector client, so cycle behaviour is
//! testable without a live collector.

use async_trait::async_trait;
use timegate_core::AttendanceRecord;
use timegate_sync::{ForwardClient, ForwardError, ForwardReport};

/// Downstream delivery for newly accepted records.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, records: &[AttendanceRecord]) -> Result<ForwardReport, ForwardError>;
}

#[async_trait]
impl Forwarder for ForwardClient {
    async fn forward(&self, records: &[AttendanceRecord]) -> Result<ForwardReport, ForwardError> {
        ForwardClient::forward(self, records).await
    }
}
