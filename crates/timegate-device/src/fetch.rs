//! Per-terminal fetch: session lifecycle, log enrichment, offline downgrade.

use std::collections::HashMap;
use std::time::Duration;

use timegate_core::{AttendanceRecord, DeviceSnapshot, DeviceStatus, Direction, UserRecord};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::DeviceError;
use crate::sdk::{RawAttendanceLog, RawUser, TerminalSdk, TerminalSession};

/// Network bounds for one terminal fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchTimeouts {
    pub connect: Duration,
    pub op: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            op: Duration::from_secs(15),
        }
    }
}

/// Fetch one terminal's user table and attendance log.
///
/// Never returns an error: any failure at any step (connect, read, parse)
/// downgrades the terminal to an offline snapshot carrying the failure
/// message, so a single unreachable device cannot abort the batch.
pub async fn fetch_terminal(
    sdk: &dyn TerminalSdk,
    ip: &str,
    port: u16,
    in_terminal_ip: &str,
    timeouts: FetchTimeouts,
) -> DeviceSnapshot {
    match try_fetch(sdk, ip, port, in_terminal_ip, timeouts).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(ip = %ip, error = %e, "terminal fetch failed, marking offline");
            DeviceSnapshot::offline(ip, e.to_string())
        }
    }
}

async fn try_fetch(
    sdk: &dyn TerminalSdk,
    ip: &str,
    port: u16,
    in_terminal_ip: &str,
    timeouts: FetchTimeouts,
) -> Result<DeviceSnapshot, DeviceError> {
    // The SDK receives the timeouts too, but the outer bound holds even if a
    // backend ignores them.
    let mut session = timeout(
        timeouts.connect,
        sdk.connect(ip, port, timeouts.connect, timeouts.op),
    )
    .await
    .map_err(|_| DeviceError::Timeout(timeouts.connect))??;

    let result = read_terminal(session.as_mut(), ip, in_terminal_ip, timeouts.op).await;

    // Best-effort teardown; a failed disconnect never masks the read result.
    if let Err(e) = session.disconnect().await {
        debug!(ip = %ip, error = %e, "disconnect failed");
    }

    result
}

async fn read_terminal(
    session: &mut dyn TerminalSession,
    ip: &str,
    in_terminal_ip: &str,
    op_timeout: Duration,
) -> Result<DeviceSnapshot, DeviceError> {
    let raw_users = timeout(op_timeout, session.get_users())
        .await
        .map_err(|_| DeviceError::Timeout(op_timeout))??;
    let raw_logs = timeout(op_timeout, session.get_attendance_logs())
        .await
        .map_err(|_| DeviceError::Timeout(op_timeout))??;

    let all_users: Vec<UserRecord> = raw_users.into_iter().filter_map(user_record).collect();
    let direction = if ip == in_terminal_ip {
        Direction::In
    } else {
        Direction::Out
    };

    let attendance_logs: Vec<AttendanceRecord> = {
        let names: HashMap<&str, &str> = all_users
            .iter()
            .map(|u| (u.user_id.as_str(), u.name.as_str()))
            .collect();
        raw_logs
            .into_iter()
            .filter_map(|log| enrich(log, ip, direction, &names))
            .collect()
    };

    let admin_users: Vec<UserRecord> = all_users.iter().filter(|u| u.is_admin()).cloned().collect();

    Ok(DeviceSnapshot {
        device_ip: ip.to_string(),
        status: DeviceStatus::Online,
        info: session.info(),
        all_users,
        admin_users,
        attendance_logs,
        error: None,
    })
}

fn user_record(raw: RawUser) -> Option<UserRecord> {
    let user_id = raw.user_id?;
    Some(UserRecord {
        user_id,
        name: raw.name.unwrap_or_else(|| "Unknown".into()),
        role: raw.role.unwrap_or(0),
    })
}

fn enrich(
    log: RawAttendanceLog,
    ip: &str,
    direction: Direction,
    names: &HashMap<&str, &str>,
) -> Option<AttendanceRecord> {
    let device_user_id = log.user_id?;
    let record_time = log.timestamp?;
    let name = names
        .get(device_user_id.as_str())
        .map_or_else(|| "Unknown".to_string(), |n| n.to_string());
    Some(AttendanceRecord {
        device_user_id,
        record_time,
        device_ip: ip.to_string(),
        name,
        direction,
        serial_number: log.serial_number,
    })
}
