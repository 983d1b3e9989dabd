//! Process snapshot collection.
//!
//! A [`ProcessSource`] enumerates the process table once and reports every field
//! as its own `Result`. The [`Collector`] turns those raw reads into records,
//! dropping any process whose required fields failed. Nothing here sorts or
//! truncates; that is the ranking step's job.

use std::thread;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::{debug, warn};

use crate::error::ReadError;
use crate::sockets::SocketTable;
use crate::types::{bytes_to_mb, CollectStats, ProcessRecord, ProcessStatus, Snapshot};

/// Field-by-field read of one process.
#[derive(Debug, Clone)]
pub struct RawProcess {
    pub pid: u32,
    pub name: Result<String, ReadError>,
    pub status: Result<ProcessStatus, ReadError>,
    pub cpu_percent: Result<f32, ReadError>,
    pub memory_bytes: Result<u64, ReadError>,
    pub disk_read_bytes: Result<u64, ReadError>,
    pub connections: Result<u32, ReadError>,
}

impl RawProcess {
    /// Build a record, or report why the process has to be dropped.
    ///
    /// Name, status, CPU and memory are required. Disk reads and connections
    /// fall back to zero when unavailable, unless the failure shows the process
    /// is gone: a half-read dead process never becomes a row.
    pub fn into_record(self) -> Result<ProcessRecord, ReadError> {
        let disk_read = optional(self.disk_read_bytes)?;
        let connections = optional(self.connections)?;
        Ok(ProcessRecord {
            pid: self.pid,
            name: self.name?,
            status: self.status?,
            cpu_percent: self.cpu_percent?.max(0.0),
            memory_rss_mb: bytes_to_mb(self.memory_bytes?),
            disk_read_mb: bytes_to_mb(disk_read),
            connection_count: connections,
        })
    }
}

fn optional<T: Default>(r: Result<T, ReadError>) -> Result<T, ReadError> {
    match r {
        Ok(v) => Ok(v),
        Err(e @ ReadError::ProcessGone { .. }) => Err(e),
        Err(_) => Ok(T::default()),
    }
}

/// Enumerates the live process table.
pub trait ProcessSource: Send {
    fn enumerate(&mut self) -> Vec<RawProcess>;
}

pub struct Collector<S = SysinfoSource> {
    source: S,
}

impl Collector<SysinfoSource> {
    pub fn new() -> Self {
        Self::with_source(SysinfoSource::new())
    }
}

impl Default for Collector<SysinfoSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ProcessSource> Collector<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Take one snapshot. Unreadable processes are skipped and counted.
    pub fn collect(&mut self) -> (Snapshot, CollectStats) {
        let raw = self.source.enumerate();
        let mut stats = CollectStats::default();
        let mut snapshot = Vec::with_capacity(raw.len());
        for p in raw {
            let pid = p.pid;
            match p.into_record() {
                Ok(rec) => snapshot.push(rec),
                Err(ReadError::ProcessGone { .. }) => stats.gone += 1,
                Err(ReadError::AccessDenied { .. }) => stats.denied += 1,
                Err(e) => {
                    debug!(pid, error = %e, "dropping unreadable process");
                    stats.failed += 1;
                }
            }
        }
        stats.readable = snapshot.len();
        if stats.skipped() > 0 {
            debug!(
                gone = stats.gone,
                denied = stats.denied,
                failed = stats.failed,
                "skipped processes during collection"
            );
        }
        (snapshot, stats)
    }
}

/// Production source: sysinfo for the process table plus the kernel socket
/// tables for per-process connection counts.
pub struct SysinfoSource {
    sys: System,
    primed: bool,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            primed: false,
        }
    }

    fn refresh(&mut self) {
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_disk_usage()
            .without_tasks();
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sys
                .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
        })) {
            warn!("sysinfo process refresh panicked: {e:?}");
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoSource {
    fn enumerate(&mut self) -> Vec<RawProcess> {
        // CPU% is a delta between two refreshes; prime once so the first
        // snapshot is not all zeros.
        if !self.primed {
            self.refresh();
            thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
            self.primed = true;
        }
        self.refresh();

        let sockets = SocketTable::read();
        self.sys
            .processes()
            .values()
            .map(|p| {
                let pid = p.pid().as_u32();
                let connections = match &sockets {
                    Some(t) => t.count_for(pid),
                    None => Err(ReadError::SensorUnavailable {
                        sensor: "socket table",
                    }),
                };
                RawProcess {
                    pid,
                    name: Ok(p.name().to_string_lossy().into_owned()),
                    status: Ok(p.status().into()),
                    cpu_percent: Ok(p.cpu_usage()),
                    memory_bytes: Ok(p.memory()),
                    disk_read_bytes: Ok(p.disk_usage().total_read_bytes),
                    connections,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(pid: u32, name: &str, cpu: f32) -> RawProcess {
        RawProcess {
            pid,
            name: Ok(name.into()),
            status: Ok(ProcessStatus::Sleeping),
            cpu_percent: Ok(cpu),
            memory_bytes: Ok(2 * 1024 * 1024),
            disk_read_bytes: Ok(1024 * 1024),
            connections: Ok(3),
        }
    }

    struct Scripted(Vec<RawProcess>);

    impl ProcessSource for Scripted {
        fn enumerate(&mut self) -> Vec<RawProcess> {
            self.0.clone()
        }
    }

    #[test]
    fn full_read_becomes_record() {
        let rec = ok(10, "bash", 1.5).into_record().unwrap();
        assert_eq!(rec.pid, 10);
        assert_eq!(rec.name, "bash");
        assert!((rec.memory_rss_mb - 2.0).abs() < 1e-9);
        assert!((rec.disk_read_mb - 1.0).abs() < 1e-9);
        assert_eq!(rec.connection_count, 3);
    }

    #[test]
    fn optional_fields_default_to_zero_when_denied() {
        let mut p = ok(10, "sshd", 0.0);
        p.disk_read_bytes = Err(ReadError::AccessDenied { pid: 10 });
        p.connections = Err(ReadError::SensorUnavailable { sensor: "x" });
        let rec = p.into_record().unwrap();
        assert_eq!(rec.disk_read_mb, 0.0);
        assert_eq!(rec.connection_count, 0);
    }

    #[test]
    fn gone_on_optional_field_drops_record() {
        let mut p = ok(10, "short-lived", 0.0);
        p.connections = Err(ReadError::ProcessGone { pid: 10 });
        assert_eq!(p.into_record(), Err(ReadError::ProcessGone { pid: 10 }));
    }

    #[test]
    fn failed_required_fields_never_produce_partial_rows() {
        let mut gone = ok(2, "gone", 5.0);
        gone.memory_bytes = Err(ReadError::ProcessGone { pid: 2 });
        let mut denied = ok(3, "denied", 5.0);
        denied.name = Err(ReadError::AccessDenied { pid: 3 });
        let mut odd = ok(4, "odd", 5.0);
        odd.status = Err(ReadError::Other {
            message: "garbled stat".into(),
        });
        let mut collector = Collector::with_source(Scripted(vec![
            ok(1, "init", 0.1),
            gone,
            denied,
            odd,
            ok(5, "kworker", 0.0),
        ]));

        let (snapshot, stats) = collector.collect();
        let pids: Vec<u32> = snapshot.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![1, 5]);
        assert_eq!(
            stats,
            CollectStats {
                readable: 2,
                gone: 1,
                denied: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn empty_table_is_a_valid_snapshot() {
        let mut collector = Collector::with_source(Scripted(Vec::new()));
        let (snapshot, stats) = collector.collect();
        assert!(snapshot.is_empty());
        assert_eq!(stats.readable, 0);
    }

    #[test]
    fn collector_keeps_enumeration_order() {
        let mut collector = Collector::with_source(Scripted(vec![
            ok(30, "c", 0.0),
            ok(10, "a", 99.0),
            ok(20, "b", 50.0),
        ]));
        let (snapshot, _) = collector.collect();
        let pids: Vec<u32> = snapshot.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![30, 10, 20]);
    }

    #[test]
    fn live_collection_includes_this_process() {
        let mut collector = Collector::new();
        let (snapshot, stats) = collector.collect();
        let me = std::process::id();
        assert!(snapshot.iter().any(|r| r.pid == me));
        assert_eq!(stats.readable, snapshot.len());
        assert!(snapshot.iter().all(|r| r.memory_rss_mb >= 0.0 && r.cpu_percent >= 0.0));
    }
}
