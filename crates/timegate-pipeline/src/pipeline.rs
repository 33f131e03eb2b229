//! The poll–dedup–persist–forward cycle and its latest-snapshot state.

use std::sync::Arc;

use futures::future::join_all;
use timegate_core::{
    AttendanceRecord, CombinedSnapshot, CycleResult, DeviceSnapshot, PipelineConfig,
    record_signature,
};
use timegate_device::{FetchTimeouts, TerminalSdk, fetch_terminal};
use timegate_store::RecordStore;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::forward::Forwarder;

/// Owns the cycle machinery and the only long-lived mutable state: the
/// signature index, the accepted-record list, and the latest snapshot.
///
/// At most one cycle runs at a time; readers of [`latest_snapshot`] always
/// see a fully formed result from some completed cycle, never an
/// interleaving of two.
///
/// [`latest_snapshot`]: Self::latest_snapshot
pub struct Pipeline {
    config: PipelineConfig,
    sdk: Arc<dyn TerminalSdk>,
    store: RecordStore,
    forwarder: Option<Arc<dyn Forwarder>>,
    day_source: Box<dyn Fn() -> String + Send + Sync>,
    ctx: Mutex<PipelineContext>,
    latest: RwLock<Option<CycleResult>>,
}

impl Pipeline {
    /// Build a pipeline, loading today's store file to seed the dedup index.
    pub fn new(
        config: PipelineConfig,
        sdk: Arc<dyn TerminalSdk>,
        forwarder: Option<Arc<dyn Forwarder>>,
    ) -> Self {
        Self::with_day_source(config, sdk, forwarder, RecordStore::today_key)
    }

    /// Like [`new`](Self::new), with an explicit source for the UTC day key.
    ///
    /// The day source decides which store file is current; everything else
    /// reads the clock only through it, so rollover behaviour can be driven
    /// without waiting for midnight.
    pub fn with_day_source(
        config: PipelineConfig,
        sdk: Arc<dyn TerminalSdk>,
        forwarder: Option<Arc<dyn Forwarder>>,
        day_source: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        let store = RecordStore::new(config.data_dir.clone());
        let ctx = PipelineContext::load(&store, &day_source());

        // Until the first cycle completes, readers see every terminal as
        // initializing rather than no snapshot at all.
        let device_snapshots: Vec<DeviceSnapshot> = config
            .terminals
            .iter()
            .map(|t| DeviceSnapshot::initializing(&t.ip))
            .collect();
        let combined = CombinedSnapshot::merge(&device_snapshots);
        let initial = CycleResult {
            device_snapshots,
            combined,
            new_records: 0,
            total_records: ctx.records.len(),
        };

        Self {
            config,
            sdk,
            store,
            forwarder,
            day_source: Box::new(day_source),
            ctx: Mutex::new(ctx),
            latest: RwLock::new(Some(initial)),
        }
    }

    /// Run one full cycle across all configured terminals.
    ///
    /// Safe to call repeatedly; a call that overlaps a cycle already in
    /// flight is refused with [`PipelineError::CycleInProgress`] instead of
    /// corrupting the in-memory index.
    pub async fn run_cycle(&self) -> Result<CycleResult, PipelineError> {
        let mut guard = self
            .ctx
            .try_lock()
            .map_err(|_| PipelineError::CycleInProgress)?;
        let ctx = &mut *guard;

        // A fresh UTC day gets a fresh store file and a fresh index, so
        // yesterday's signatures cannot suppress today's records.
        let day = (self.day_source)();
        if day != ctx.day {
            info!(from = %ctx.day, to = %day, "day rollover, reloading store");
            *ctx = PipelineContext::load(&self.store, &day);
        }

        let timeouts = FetchTimeouts {
            connect: self.config.connect_timeout,
            op: self.config.op_timeout,
        };
        let fetches = self.config.terminals.iter().map(|terminal| {
            fetch_terminal(
                self.sdk.as_ref(),
                &terminal.ip,
                terminal.port,
                &self.config.in_terminal_ip,
                timeouts,
            )
        });
        // Settle-all: every fetch resolves to a snapshot, online or offline.
        let device_snapshots: Vec<DeviceSnapshot> = join_all(fetches).await;

        let combined = CombinedSnapshot::merge(&device_snapshots);

        let mut fresh: Vec<AttendanceRecord> = Vec::new();
        for record in &combined.attendance_logs {
            let signature = record_signature(record);
            if !ctx.index.is_known(&signature) {
                ctx.index.mark_known(signature);
                fresh.push(record.clone());
            }
        }

        if !fresh.is_empty() {
            ctx.records.extend(fresh.iter().cloned());
            if let Err(e) = self.store.save(&ctx.day, &mut ctx.records, &mut ctx.index) {
                // In-memory state stays authoritative; the next cycle's save
                // rewrites the full collection anyway.
                warn!(error = %e, "store write failed, keeping in-memory records");
            }
            if let Some(forwarder) = &self.forwarder {
                match forwarder.forward(&fresh).await {
                    Ok(report) => {
                        info!(forwarded = report.forwarded, "forwarded new records");
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            count = fresh.len(),
                            "forward failed, records remain in the local store"
                        );
                    }
                }
            }
        }

        let result = CycleResult {
            device_snapshots,
            combined,
            new_records: fresh.len(),
            total_records: ctx.records.len(),
        };
        *self.latest.write().await = Some(result.clone());
        info!(
            new = result.new_records,
            total = result.total_records,
            devices = result.device_snapshots.len(),
            online = result.combined.info.online,
            "cycle complete"
        );
        Ok(result)
    }

    /// Latest snapshot: initializing placeholders until the first cycle
    /// completes, then the result of the most recent completed cycle.
    pub async fn latest_snapshot(&self) -> Option<CycleResult> {
        self.latest.read().await.clone()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
