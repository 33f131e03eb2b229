//! Long-lived pipeline state: the signature index, the accepted-record list,
//! and the day they were loaded from.

use timegate_core::{AttendanceRecord, SignatureIndex};
use timegate_store::RecordStore;
use tracing::info;

/// Owned by the [`Pipeline`](crate::Pipeline); mutated only inside a cycle
/// run, with no ambient globals.
#[derive(Debug)]
pub struct PipelineContext {
    pub day: String,
    pub index: SignatureIndex,
    pub records: Vec<AttendanceRecord>,
}

impl PipelineContext {
    /// Load state for the given day from the store, rebuilding the signature
    /// index from the persisted records.
    pub fn load(store: &RecordStore, day: &str) -> Self {
        let mut index = SignatureIndex::new();
        let records = store.load(day, &mut index);
        info!(day, count = records.len(), "loaded record store");
        Self {
            day: day.to_string(),
            index,
            records,
        }
    }
}
