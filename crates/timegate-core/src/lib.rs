//! Core types, record signatures, and shared configuration for Timegate.

pub mod config;
pub mod record;
pub mod signature;
pub mod snapshot;

pub use config::{PipelineConfig, TerminalConfig, DEFAULT_TERMINAL_PORT};
pub use record::{ADMIN_ROLE, AttendanceRecord, Direction, UserRecord};
pub use signature::{SignatureIndex, record_signature};
pub use snapshot::{CombinedSnapshot, CycleResult, DeviceSnapshot, DeviceStatus, SnapshotInfo};
