use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("connect to {ip} failed: {reason}")]
    Connect { ip: String, reason: String },

    #[error("terminal operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("terminal protocol error: {0}")]
    Protocol(String),
}
