//! Refresh scheduler: one periodic task per metrics stream.
//!
//! Host metrics and process snapshots run on independent timers. Sampling runs
//! on tokio's blocking pool so the CPU sample window never stalls intent
//! handling. Each result replaces the previous one wholesale through a `watch`
//! channel; readers never see a half-built table.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::collector::{Collector, ProcessSource};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::host::{HostProbe, HostReader};
use crate::rank::rank;
use crate::sort_state::SortHandle;
use crate::types::{HostSnapshot, ProcessTable};

pub type HostUpdates = watch::Receiver<Option<HostSnapshot>>;
pub type TableUpdates = watch::Receiver<Option<Arc<ProcessTable>>>;

pub struct RefreshScheduler {
    host_rx: HostUpdates,
    table_rx: TableUpdates,
    wake: Arc<Notify>,
    tasks: Vec<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Start both streams against the live host.
    pub fn start(cfg: &EngineConfig, sort: SortHandle) -> Result<Self, EngineError> {
        let handle = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        Self::spawn(
            &handle,
            cfg,
            sort,
            HostReader::from_config(cfg),
            Collector::new(),
        )
    }

    /// Start both streams with caller-provided samplers.
    pub fn start_with<H, S>(
        cfg: &EngineConfig,
        sort: SortHandle,
        host: H,
        collector: Collector<S>,
    ) -> Result<Self, EngineError>
    where
        H: HostProbe + 'static,
        S: ProcessSource + 'static,
    {
        let handle = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        Self::spawn(&handle, cfg, sort, host, collector)
    }

    fn spawn<H, S>(
        handle: &Handle,
        cfg: &EngineConfig,
        sort: SortHandle,
        host: H,
        collector: Collector<S>,
    ) -> Result<Self, EngineError>
    where
        H: HostProbe + 'static,
        S: ProcessSource + 'static,
    {
        cfg.validate()?;
        let (host_tx, host_rx) = watch::channel(None);
        let (table_tx, table_rx) = watch::channel(None);
        let wake = Arc::new(Notify::new());

        let host_task = handle.spawn(host_loop(
            Arc::new(Mutex::new(host)),
            cfg.host_interval(),
            host_tx,
        ));
        let process_task = handle.spawn(process_loop(
            Arc::new(Mutex::new(collector)),
            cfg.process_interval(),
            cfg.row_limit,
            sort,
            Arc::clone(&wake),
            table_tx,
        ));
        debug!(
            host_interval_s = cfg.host_interval_secs,
            process_interval_s = cfg.process_interval_secs,
            "refresh scheduler started"
        );

        Ok(Self {
            host_rx,
            table_rx,
            wake,
            tasks: vec![host_task, process_task],
        })
    }

    pub fn host_updates(&self) -> HostUpdates {
        self.host_rx.clone()
    }

    pub fn table_updates(&self) -> TableUpdates {
        self.table_rx.clone()
    }

    /// Run a process cycle now instead of waiting for the timer.
    pub fn refresh_now(&self) {
        // notify_one keeps a permit if the task is mid-collection
        self.wake.notify_one();
    }

    pub async fn shutdown(mut self) {
        for t in self.tasks.drain(..) {
            t.abort();
            let _ = t.await;
        }
        debug!("refresh scheduler stopped");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        for t in &self.tasks {
            t.abort();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn host_loop<H: HostProbe + 'static>(
    probe: Arc<Mutex<H>>,
    period: Duration,
    tx: watch::Sender<Option<HostSnapshot>>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let probe = Arc::clone(&probe);
        match task::spawn_blocking(move || lock(&probe).read()).await {
            Ok(snap) => {
                tx.send_replace(Some(snap));
            }
            Err(e) => warn!("host metrics read failed: {e}"),
        }
    }
}

async fn process_loop<S: ProcessSource + 'static>(
    collector: Arc<Mutex<Collector<S>>>,
    period: Duration,
    limit: usize,
    sort: SortHandle,
    wake: Arc<Notify>,
    tx: watch::Sender<Option<Arc<ProcessTable>>>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = wake.notified() => ticker.reset(),
        }
        let c = Arc::clone(&collector);
        let (snapshot, stats) = match task::spawn_blocking(move || lock(&c).collect()).await {
            Ok(v) => v,
            Err(e) => {
                warn!("process collection failed: {e}");
                continue;
            }
        };
        // one read per cycle; intents arriving now apply to the next cycle
        let spec = sort.get();
        let total = snapshot.len();
        let rows = rank(snapshot, spec, limit);
        tx.send_replace(Some(Arc::new(ProcessTable {
            rows,
            total,
            sort: spec,
            stats,
            captured_at: Local::now(),
        })));
    }
}
