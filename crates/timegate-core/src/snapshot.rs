//! Per-terminal and merged snapshot views exposed to external readers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AttendanceRecord, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Initializing,
}

/// Result of one fetch cycle for a single terminal.
///
/// Replaced wholesale on every cycle, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    #[serde(rename = "deviceIP")]
    pub device_ip: String,
    pub status: DeviceStatus,
    /// Opaque terminal metadata as reported by the SDK.
    pub info: serde_json::Value,
    pub all_users: Vec<UserRecord>,
    pub admin_users: Vec<UserRecord>,
    pub attendance_logs: Vec<AttendanceRecord>,
    /// Present iff the terminal is offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeviceSnapshot {
    /// Synthesised snapshot for a terminal whose fetch failed at any step.
    pub fn offline(device_ip: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            device_ip: device_ip.into(),
            status: DeviceStatus::Offline,
            info: serde_json::Value::Null,
            all_users: Vec::new(),
            admin_users: Vec::new(),
            attendance_logs: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Placeholder shown to readers before the first cycle has polled the
    /// terminal.
    pub fn initializing(device_ip: impl Into<String>) -> Self {
        Self {
            device_ip: device_ip.into(),
            status: DeviceStatus::Initializing,
            info: serde_json::Value::Null,
            all_users: Vec::new(),
            admin_users: Vec::new(),
            attendance_logs: Vec::new(),
            error: None,
        }
    }
}

/// Counts summarising a [`CombinedSnapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub devices: usize,
    pub online: usize,
    pub users: usize,
    pub admins: usize,
    pub logs: usize,
}

/// Merged view across all terminals. Recomputed every cycle, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSnapshot {
    pub info: SnapshotInfo,
    pub all_users: Vec<UserRecord>,
    pub admin_users: Vec<UserRecord>,
    pub attendance_logs: Vec<AttendanceRecord>,
}

impl CombinedSnapshot {
    /// Merge per-terminal snapshots: logs are concatenated in snapshot order,
    /// user lists deduplicated by user id with the last occurrence winning.
    pub fn merge(snapshots: &[DeviceSnapshot]) -> Self {
        let all_users = dedup_users(snapshots.iter().flat_map(|s| s.all_users.iter().cloned()));
        let admin_users =
            dedup_users(snapshots.iter().flat_map(|s| s.admin_users.iter().cloned()));
        let attendance_logs: Vec<AttendanceRecord> = snapshots
            .iter()
            .flat_map(|s| s.attendance_logs.iter().cloned())
            .collect();
        let info = SnapshotInfo {
            devices: snapshots.len(),
            online: snapshots
                .iter()
                .filter(|s| s.status == DeviceStatus::Online)
                .count(),
            users: all_users.len(),
            admins: admin_users.len(),
            logs: attendance_logs.len(),
        };
        Self {
            info,
            all_users,
            admin_users,
            attendance_logs,
        }
    }
}

/// Last occurrence wins; the position of the first occurrence is kept, so the
/// output order is deterministic given the input order.
fn dedup_users(users: impl IntoIterator<Item = UserRecord>) -> Vec<UserRecord> {
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<UserRecord> = Vec::new();
    for user in users {
        match by_id.get(&user.user_id) {
            Some(&slot) => out[slot] = user,
            None => {
                by_id.insert(user.user_id.clone(), out.len());
                out.push(user);
            }
        }
    }
    out
}

/// Outcome of one full poll–dedup–persist–forward cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResult {
    pub device_snapshots: Vec<DeviceSnapshot>,
    pub combined: CombinedSnapshot,
    pub new_records: usize,
    pub total_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use chrono::{TimeZone, Utc};

    fn user(id: &str, name: &str, role: i32) -> UserRecord {
        UserRecord {
            user_id: id.into(),
            name: name.into(),
            role,
        }
    }

    fn log(ip: &str, user_id: &str, hour: u32) -> AttendanceRecord {
        AttendanceRecord {
            device_user_id: user_id.into(),
            record_time: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            device_ip: ip.into(),
            name: "X".into(),
            direction: Direction::Out,
            serial_number: None,
        }
    }

    fn online(ip: &str, users: Vec<UserRecord>, logs: Vec<AttendanceRecord>) -> DeviceSnapshot {
        let admin_users = users.iter().filter(|u| u.is_admin()).cloned().collect();
        DeviceSnapshot {
            device_ip: ip.into(),
            status: DeviceStatus::Online,
            info: serde_json::Value::Null,
            all_users: users,
            admin_users,
            attendance_logs: logs,
            error: None,
        }
    }

    #[test]
    fn last_occurrence_wins_across_terminals() {
        let a = online("10.0.0.1", vec![user("1", "X", 0)], vec![]);
        let b = online("10.0.0.2", vec![user("1", "Y", 0)], vec![]);
        let combined = CombinedSnapshot::merge(&[a, b]);
        assert_eq!(combined.all_users.len(), 1);
        assert_eq!(combined.all_users[0].name, "Y");
    }

    #[test]
    fn logs_concatenate_in_snapshot_order() {
        let a = online("10.0.0.1", vec![], vec![log("10.0.0.1", "1", 8)]);
        let b = online(
            "10.0.0.2",
            vec![],
            vec![log("10.0.0.2", "1", 17), log("10.0.0.2", "2", 18)],
        );
        let combined = CombinedSnapshot::merge(&[a, b]);
        assert_eq!(combined.attendance_logs.len(), 3);
        assert_eq!(combined.attendance_logs[0].device_ip, "10.0.0.1");
        assert_eq!(combined.attendance_logs[2].device_user_id, "2");
    }

    #[test]
    fn info_counts_reflect_merge() {
        let a = online(
            "10.0.0.1",
            vec![user("1", "X", 0), user("2", "Admin", 14)],
            vec![log("10.0.0.1", "1", 8)],
        );
        let offline = DeviceSnapshot::offline("10.0.0.2", "connect refused");
        let combined = CombinedSnapshot::merge(&[a, offline]);
        assert_eq!(combined.info.devices, 2);
        assert_eq!(combined.info.online, 1);
        assert_eq!(combined.info.users, 2);
        assert_eq!(combined.info.admins, 1);
        assert_eq!(combined.info.logs, 1);
    }

    #[test]
    fn offline_snapshot_carries_error_and_empty_lists() {
        let snap = DeviceSnapshot::offline("10.0.0.9", "timed out");
        assert_eq!(snap.status, DeviceStatus::Offline);
        assert_eq!(snap.error.as_deref(), Some("timed out"));
        assert!(snap.all_users.is_empty());
        assert!(snap.attendance_logs.is_empty());
    }
}
