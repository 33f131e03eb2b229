//! Daily-partitioned JSON persistence for accepted attendance records.
//!
//! One pretty-printed JSON array per UTC day (`YYYY-MM-DD.json`). Every save
//! serialises the full in-memory collection; at this record volume the
//! rewrite keeps the file and the signature index trivially consistent.

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use timegate_core::{AttendanceRecord, SignatureIndex, record_signature};
use tracing::{info, warn};

pub use error::StoreError;

/// Append-only per-day record store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Day key for the current UTC calendar date.
    pub fn today_key() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Load one day's records, registering each record's signature in the
    /// index. Malformed entries and duplicate signatures in the raw file are
    /// skipped; an unreadable or missing file yields an empty list so the
    /// pipeline starts fresh rather than aborting.
    pub fn load(&self, day: &str, index: &mut SignatureIndex) -> Vec<AttendanceRecord> {
        let path = match self.day_path(day) {
            Ok(path) => path,
            Err(e) => {
                warn!(day, error = %e, "refusing to load store file");
                return Vec::new();
            }
        };
        if !path.exists() {
            return Vec::new();
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(day, error = %e, "failed to read store file, starting empty");
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for record in parse_records(&raw) {
            let signature = record_signature(&record);
            if index.is_known(&signature) {
                warn!(day, signature = %signature, "dropping duplicate record on load");
                continue;
            }
            index.mark_known(signature);
            records.push(record);
        }
        records
    }

    /// Write the full record list for a day.
    ///
    /// Before writing, records the file gained externally since the last load
    /// are merged in by signature, so a hand-edited or externally appended
    /// file is never silently truncated.
    pub fn save(
        &self,
        day: &str,
        records: &mut Vec<AttendanceRecord>,
        index: &mut SignatureIndex,
    ) -> Result<(), StoreError> {
        let path = self.day_path(day)?;

        if path.exists() {
            if let Ok(raw) = fs::read_to_string(&path) {
                for record in parse_records(&raw) {
                    let signature = record_signature(&record);
                    if !index.is_known(&signature) {
                        warn!(day, signature = %signature, "merging externally added record");
                        index.mark_known(signature);
                        records.push(record);
                    }
                }
            }
        }

        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json)?;
        info!(day, count = records.len(), "saved record store");
        Ok(())
    }

    /// Days present on disk, sorted ascending.
    pub fn list_days(&self) -> Result<Vec<String>, StoreError> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut days = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(day) = name.strip_suffix(".json") {
                if validate_day(day).is_ok() {
                    days.push(day.to_string());
                }
            }
        }
        days.sort();
        Ok(days)
    }

    /// Read one day's file as-is, malformed entries skipped.
    pub fn read_day(&self, day: &str) -> Result<Vec<AttendanceRecord>, StoreError> {
        let path = self.day_path(day)?;
        if !path.exists() {
            return Err(StoreError::DayNotFound(day.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(parse_records(&raw))
    }

    pub fn delete_day(&self, day: &str) -> Result<(), StoreError> {
        let path = self.day_path(day)?;
        if !path.exists() {
            return Err(StoreError::DayNotFound(day.to_string()));
        }
        fs::remove_file(&path)?;
        info!(day, "deleted record store file");
        Ok(())
    }

    fn day_path(&self, day: &str) -> Result<PathBuf, StoreError> {
        validate_day(day)?;
        Ok(self.data_dir.join(format!("{day}.json")))
    }
}

/// Accept only a bare `YYYY-MM-DD` stamp; anything else, including path
/// separators or traversal segments, is rejected before touching the
/// filesystem.
fn validate_day(day: &str) -> Result<(), StoreError> {
    if day.len() != 10 || NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err() {
        return Err(StoreError::InvalidDay(day.to_string()));
    }
    Ok(())
}

fn parse_records(raw: &str) -> Vec<AttendanceRecord> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "store file is not a JSON array, ignoring contents");
            return Vec::new();
        }
    };
    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<AttendanceRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!(error = %e, "skipping malformed record"),
        }
    }
    records
}
