//! Pipeline configuration assembled by the CLI and consumed by the scheduler.

use std::path::PathBuf;
use std::time::Duration;

/// Vendor default port for attendance terminals.
pub const DEFAULT_TERMINAL_PORT: u16 = 4370;

/// One polled terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    pub ip: String,
    pub port: u16,
}

impl TerminalConfig {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }
}

/// Everything the pipeline needs to run: the terminal list, timeouts, the
/// store location, and the optional downstream collector.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub terminals: Vec<TerminalConfig>,
    /// Terminal whose records are stamped `IN`; all others map to `OUT`.
    pub in_terminal_ip: String,
    pub connect_timeout: Duration,
    pub op_timeout: Duration,
    pub poll_interval: Duration,
    pub data_dir: PathBuf,
    /// Base URL of the downstream collector; `None` disables forwarding.
    pub collector_url: Option<String>,
}

impl PipelineConfig {
    /// Config with default timeouts (connect 10 s, operation 15 s) and the
    /// default 30-minute poll interval.
    pub fn new(
        terminals: Vec<TerminalConfig>,
        in_terminal_ip: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            terminals,
            in_terminal_ip: in_terminal_ip.into(),
            connect_timeout: Duration::from_secs(10),
            op_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(30 * 60),
            data_dir: data_dir.into(),
            collector_url: None,
        }
    }
}
