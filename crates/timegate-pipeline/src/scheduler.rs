//! Fixed-interval polling loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::Pipeline;

/// Drive the pipeline on a fixed wall-clock interval until the task is
/// dropped or aborted.
///
/// The first cycle runs immediately. A tick that arrives while a cycle is
/// still in flight is skipped rather than queued, so slow or hanging
/// terminals can never stack overlapping cycles.
pub async fn run_scheduler(pipeline: Arc<Pipeline>, poll_interval: Duration) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match pipeline.run_cycle().await {
            Ok(result) => info!(
                new = result.new_records,
                total = result.total_records,
                "scheduled cycle finished"
            ),
            Err(PipelineError::CycleInProgress) => {
                warn!("previous cycle still running, skipping tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use timegate_core::{PipelineConfig, TerminalConfig};
    use timegate_device::sim::{SimSdk, SimTerminal};
    use timegate_device::{RawAttendanceLog, RawUser};

    #[tokio::test]
    async fn scheduler_runs_cycles_on_the_interval() {
        let tmp = TempDir::new().unwrap();
        let sdk = SimSdk::new().with_terminal(
            "10.0.0.1",
            SimTerminal {
                users: vec![RawUser {
                    user_id: Some("7".into()),
                    name: Some("Alice".into()),
                    role: Some(0),
                }],
                logs: vec![RawAttendanceLog {
                    user_id: Some("7".into()),
                    timestamp: Some(chrono::Utc::now()),
                    serial_number: None,
                }],
                ..Default::default()
            },
        );
        let config = PipelineConfig::new(
            vec![TerminalConfig::new("10.0.0.1", 4370)],
            "10.0.0.1",
            tmp.path(),
        );
        let pipeline = Arc::new(Pipeline::new(config, Arc::new(sdk), None));

        let task = tokio::spawn(run_scheduler(
            pipeline.clone(),
            Duration::from_millis(10),
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        let snapshot = pipeline.latest_snapshot().await.unwrap();
        assert_eq!(snapshot.total_records, 1);
    }
}
