//! Opaque device-SDK collaborator surface.
//!
//! The vendor wire protocol is deliberately not implemented here. Backends
//! implement these traits; [`crate::sim`] ships an in-memory one for tests
//! and hardware-free runs. The contract on every operation is "fails cleanly,
//! never leaves a dangling session".

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::DeviceError;

/// User table entry as the SDK reports it. Fields the firmware omits are
/// `None` and default deterministically during enrichment.
#[derive(Debug, Clone, Default)]
pub struct RawUser {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub role: Option<i32>,
}

/// Attendance log entry as the SDK reports it.
///
/// Entries missing a user id or timestamp cannot be identified and are
/// dropped during enrichment.
#[derive(Debug, Clone, Default)]
pub struct RawAttendanceLog {
    pub user_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub serial_number: Option<String>,
}

/// Factory for terminal sessions.
#[async_trait]
pub trait TerminalSdk: Send + Sync {
    async fn connect(
        &self,
        ip: &str,
        port: u16,
        connect_timeout: Duration,
        op_timeout: Duration,
    ) -> Result<Box<dyn TerminalSession>, DeviceError>;
}

/// One open terminal session.
#[async_trait]
pub trait TerminalSession: Send {
    /// Opaque terminal metadata (model, firmware, counters).
    fn info(&self) -> serde_json::Value;

    async fn get_users(&mut self) -> Result<Vec<RawUser>, DeviceError>;

    async fn get_attendance_logs(&mut self) -> Result<Vec<RawAttendanceLog>, DeviceError>;

    async fn disconnect(&mut self) -> Result<(), DeviceError>;
}
