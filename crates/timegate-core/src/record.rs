//! Attendance types shared between the terminals, the store, and the collector.
//!
//! Persisted and forwarded JSON keeps the collector's camelCase field names
//! (`deviceUserId`, `recordTime`, `deviceIP`, `type`), so day files written by
//! earlier deployments load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role value the terminal firmware assigns to administrator accounts.
pub const ADMIN_ROLE: i32 = 14;

/// Punch direction, derived solely from which terminal produced the record:
/// the configured in-terminal stamps `IN`, every other terminal stamps `OUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

/// One enriched attendance event.
///
/// Built by the device fetcher from a raw terminal log: the name is resolved
/// from the terminal's user table at fetch time ("Unknown" if absent) and the
/// device-clock timestamp is normalised to UTC on ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub device_user_id: String,
    pub record_time: DateTime<Utc>,
    #[serde(rename = "deviceIP")]
    pub device_ip: String,
    pub name: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Passthrough from the raw device log; not every firmware reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// A terminal-local user table entry.
///
/// `user_id` is the dedup key when merging user lists across terminals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub role: i32,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_json_uses_collector_field_names() {
        let record = AttendanceRecord {
            device_user_id: "7".into(),
            record_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            device_ip: "10.0.0.1".into(),
            name: "Alice".into(),
            direction: Direction::In,
            serial_number: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["deviceUserId"], "7");
        assert_eq!(json["deviceIP"], "10.0.0.1");
        assert_eq!(json["type"], "IN");
        assert_eq!(json["recordTime"], "2024-01-01T08:00:00Z");
        assert!(json.get("serialNumber").is_none());
    }

    #[test]
    fn record_json_roundtrip() {
        let record = AttendanceRecord {
            device_user_id: "42".into(),
            record_time: Utc.with_ymd_and_hms(2024, 6, 15, 17, 30, 0).unwrap(),
            device_ip: "10.0.0.2".into(),
            name: "Unknown".into(),
            direction: Direction::Out,
            serial_number: Some("ZK-9912".into()),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: AttendanceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.device_user_id, "42");
        assert_eq!(parsed.direction, Direction::Out);
        assert_eq!(parsed.serial_number.as_deref(), Some("ZK-9912"));
    }

    #[test]
    fn admin_role_is_14() {
        let admin = UserRecord {
            user_id: "1".into(),
            name: "Root".into(),
            role: 14,
        };
        let regular = UserRecord {
            user_id: "2".into(),
            name: "Staff".into(),
            role: 0,
        };
        assert!(admin.is_admin());
        assert!(!regular.is_admin());
    }
}
