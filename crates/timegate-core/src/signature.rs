//! Signature-based deduplication across overlapping polls.
//!
//! The device SDK returns its full log buffer on every poll, not a delta, so
//! consecutive cycles see mostly the same events. The signature index is the
//! sole mechanism keeping those overlaps from being persisted or forwarded
//! twice.

use std::collections::HashSet;

use crate::AttendanceRecord;

/// Deterministic dedup key for an attendance record:
/// `deviceIP + "_" + deviceUserId + "_" + epoch-millis(recordTime)`.
pub fn record_signature(record: &AttendanceRecord) -> String {
    format!(
        "{}_{}_{}",
        record.device_ip,
        record.device_user_id,
        record.record_time.timestamp_millis()
    )
}

/// Set of signatures already accepted into the store.
///
/// Pure and synchronous; rebuilt from the day file at startup and on day
/// rollover.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    known: HashSet<String>,
}

impl SignatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, signature: &str) -> bool {
        self.known.contains(signature)
    }

    /// Idempotent: marking an already-known signature is a no-op.
    pub fn mark_known(&mut self, signature: String) {
        self.known.insert(signature);
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
