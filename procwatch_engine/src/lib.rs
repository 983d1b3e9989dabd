//! Sampling, ranking and process-control engine for procwatch.
//!
//! Front ends start an [`Engine`], watch its host and table channels, and feed
//! user intents (sort changes, kill requests) back through it.

pub mod collector;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod host;
pub mod rank;
pub mod scheduler;
pub mod sockets;
pub mod sort_state;
pub mod types;

pub use collector::{Collector, ProcessSource, RawProcess, SysinfoSource};
pub use config::EngineConfig;
pub use control::terminate;
pub use engine::Engine;
pub use error::{EngineError, ParseSortError, ReadError};
pub use host::{HostProbe, HostReader};
pub use rank::rank;
pub use scheduler::{HostUpdates, RefreshScheduler, TableUpdates};
pub use sort_state::SortHandle;
pub use types::{
    CollectStats, DiskUsage, HostSnapshot, KillOutcome, ProcessRecord, ProcessStatus,
    ProcessTable, Snapshot, SortDirection, SortKey, SortSpec,
};
