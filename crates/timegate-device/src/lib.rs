//! Terminal session boundary: SDK collaborator traits, the per-terminal
//! fetcher, and an in-memory simulated backend.

mod error;
mod fetch;
pub mod sdk;
pub mod sim;

pub use error::DeviceError;
pub use fetch::{FetchTimeouts, fetch_terminal};
pub use sdk::{RawAttendanceLog, RawUser, TerminalSdk, TerminalSession};
