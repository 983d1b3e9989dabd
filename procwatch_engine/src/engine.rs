//! Engine facade: what a presentation adapter talks to.

use tokio::task;
use tracing::{info, warn};

use crate::collector::{Collector, ProcessSource};
use crate::config::EngineConfig;
use crate::control::terminate;
use crate::error::EngineError;
use crate::host::HostProbe;
use crate::scheduler::{HostUpdates, RefreshScheduler, TableUpdates};
use crate::sort_state::SortHandle;
use crate::types::{KillOutcome, SortDirection, SortKey, SortSpec};

pub struct Engine {
    config: EngineConfig,
    sort: SortHandle,
    scheduler: RefreshScheduler,
}

impl Engine {
    /// Validate `config` and start sampling the live host.
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let sort = SortHandle::new(config.initial_sort());
        let scheduler = RefreshScheduler::start(&config, sort.clone())?;
        Ok(Self {
            config,
            sort,
            scheduler,
        })
    }

    pub fn start_with<H, S>(
        config: EngineConfig,
        host: H,
        collector: Collector<S>,
    ) -> Result<Self, EngineError>
    where
        H: HostProbe + 'static,
        S: ProcessSource + 'static,
    {
        let sort = SortHandle::new(config.initial_sort());
        let scheduler = RefreshScheduler::start_with(&config, sort.clone(), host, collector)?;
        Ok(Self {
            config,
            sort,
            scheduler,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort.get()
    }

    pub fn host_updates(&self) -> HostUpdates {
        self.scheduler.host_updates()
    }

    pub fn table_updates(&self) -> TableUpdates {
        self.scheduler.table_updates()
    }

    /// Sort-key intent. Applies from the next process cycle, which is started right away.
    pub fn on_sort_key_changed(&self, key: SortKey, direction: SortDirection) {
        let spec = SortSpec::new(key, direction);
        self.sort.set(spec);
        info!(sort = %spec, "sort changed");
        self.scheduler.refresh_now();
    }

    pub fn toggle_sort_direction(&self) -> SortSpec {
        let spec = self.sort.toggle_direction();
        info!(sort = %spec, "sort direction reversed");
        self.scheduler.refresh_now();
        spec
    }

    /// Kill intent. Waits up to the configured timeout on the blocking pool.
    pub async fn on_kill_requested(&self, pid: u32) -> KillOutcome {
        let timeout = self.config.kill_timeout();
        let outcome = match task::spawn_blocking(move || terminate(pid, timeout)).await {
            Ok(o) => o,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(pid, "kill request abandoned: {e}");
                KillOutcome::TimedOut
            }
        };
        if outcome == KillOutcome::Terminated {
            self.scheduler.refresh_now();
        }
        outcome
    }

    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }
}
