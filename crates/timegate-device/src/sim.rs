//! Simulated terminal backend for tests and hardware-free runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::DeviceError;
use crate::sdk::{RawAttendanceLog, RawUser, TerminalSdk, TerminalSession};

/// Scripted state served for one simulated terminal.
#[derive(Debug, Clone, Default)]
pub struct SimTerminal {
    pub users: Vec<RawUser>,
    pub logs: Vec<RawAttendanceLog>,
    /// Refuse the connection outright.
    pub fail_connect: bool,
    /// Fail the attendance log read after a successful connect.
    pub fail_logs: bool,
    /// Delay the attendance log read, to exercise timeouts and overlap guards.
    pub log_delay: Option<Duration>,
}

/// SDK backend serving scripted terminals keyed by IP.
#[derive(Debug, Default)]
pub struct SimSdk {
    terminals: HashMap<String, SimTerminal>,
}

impl SimSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terminal(mut self, ip: impl Into<String>, terminal: SimTerminal) -> Self {
        self.terminals.insert(ip.into(), terminal);
        self
    }
}

#[async_trait]
impl TerminalSdk for SimSdk {
    async fn connect(
        &self,
        ip: &str,
        _port: u16,
        _connect_timeout: Duration,
        _op_timeout: Duration,
    ) -> Result<Box<dyn TerminalSession>, DeviceError> {
        let Some(terminal) = self.terminals.get(ip) else {
            return Err(DeviceError::Connect {
                ip: ip.to_string(),
                reason: "no route to host".into(),
            });
        };
        if terminal.fail_connect {
            return Err(DeviceError::Connect {
                ip: ip.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(Box::new(SimSession {
            ip: ip.to_string(),
            terminal: terminal.clone(),
        }))
    }
}

struct SimSession {
    ip: String,
    terminal: SimTerminal,
}

#[async_trait]
impl TerminalSession for SimSession {
    fn info(&self) -> serde_json::Value {
        serde_json::json!({
            "model": "sim-terminal",
            "ip": self.ip,
            "userCount": self.terminal.users.len(),
            "logCount": self.terminal.logs.len(),
        })
    }

    async fn get_users(&mut self) -> Result<Vec<RawUser>, DeviceError> {
        Ok(self.terminal.users.clone())
    }

    async fn get_attendance_logs(&mut self) -> Result<Vec<RawAttendanceLog>, DeviceError> {
        if let Some(delay) = self.terminal.log_delay {
            tokio::time::sleep(delay).await;
        }
        if self.terminal.fail_logs {
            return Err(DeviceError::Protocol("attendance log read failed".into()));
        }
        Ok(self.terminal.logs.clone())
    }

    async fn disconnect(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}
