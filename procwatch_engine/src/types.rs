//! Value objects handed to the presentation layer.
//! Everything here is render-ready: percentages precomputed, sizes in MB, clocks in GHz.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ParseSortError;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_GB: f64 = BYTES_PER_MB * 1024.0;

pub fn bytes_to_mb(b: u64) -> f64 {
    b as f64 / BYTES_PER_MB
}

/// Usage of the single configured volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub mount: String,
    pub used_percent: f64,
    pub total_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSnapshot {
    pub username: String,
    pub uptime: Duration,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub max_freq_ghz: Option<f64>,
    pub current_freq_ghz: Option<f64>,
    pub battery_percent: Option<f32>,
    pub disk: Option<DiskUsage>,
    pub process_count: usize,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    // cumulative since boot, summed over every interface
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub connection_count: Option<usize>,
}

impl HostSnapshot {
    pub fn sent_mb(&self) -> f64 {
        bytes_to_mb(self.bytes_sent)
    }

    pub fn recv_mb(&self) -> f64 {
        bytes_to_mb(self.bytes_recv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Stopped,
    Zombie,
    Unknown,
}

impl ProcessStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Unknown => "unknown",
        }
    }
}

impl From<sysinfo::ProcessStatus> for ProcessStatus {
    fn from(s: sysinfo::ProcessStatus) -> Self {
        use sysinfo::ProcessStatus as S;
        match s {
            S::Run => ProcessStatus::Running,
            S::Sleep | S::Idle | S::UninterruptibleDiskSleep => ProcessStatus::Sleeping,
            S::Stop | S::Tracing => ProcessStatus::Stopped,
            S::Zombie | S::Dead => ProcessStatus::Zombie,
            _ => ProcessStatus::Unknown,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the process table. The pid is only meaningful within the
/// snapshot that produced it; the OS recycles identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub status: ProcessStatus,
    pub cpu_percent: f32,
    pub memory_rss_mb: f64,
    pub disk_read_mb: f64,
    pub connection_count: u32,
}

/// Processes in OS enumeration order.
pub type Snapshot = Vec<ProcessRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Pid,
    Name,
    Status,
    Cpu,
    Memory,
    Disk,
    Network,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Pid,
        SortKey::Name,
        SortKey::Status,
        SortKey::Cpu,
        SortKey::Memory,
        SortKey::Disk,
        SortKey::Network,
    ];

    /// Identifiers and labels read naturally A→Z; usage columns biggest first.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortKey::Pid | SortKey::Name | SortKey::Status => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Pid => "pid",
            SortKey::Name => "name",
            SortKey::Status => "status",
            SortKey::Cpu => "cpu",
            SortKey::Memory => "memory",
            SortKey::Disk => "disk",
            SortKey::Network => "network",
        }
    }

    pub(crate) fn index(self) -> u8 {
        match self {
            SortKey::Pid => 0,
            SortKey::Name => 1,
            SortKey::Status => 2,
            SortKey::Cpu => 3,
            SortKey::Memory => 4,
            SortKey::Disk => 5,
            SortKey::Network => 6,
        }
    }

    pub(crate) fn from_index(i: u8) -> Option<SortKey> {
        SortKey::ALL.get(i as usize).copied()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pid" => Ok(SortKey::Pid),
            "name" => Ok(SortKey::Name),
            "status" => Ok(SortKey::Status),
            "cpu" => Ok(SortKey::Cpu),
            "memory" | "mem" => Ok(SortKey::Memory),
            "disk" => Ok(SortKey::Disk),
            "network" | "net" => Ok(SortKey::Network),
            _ => Err(ParseSortError::Key(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ParseSortError::Direction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The key paired with its natural direction.
    pub fn for_key(key: SortKey) -> Self {
        Self::new(key, key.default_direction())
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::Cpu, SortDirection::Descending)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.direction.as_str())
    }
}

/// Result of one termination attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KillOutcome {
    Terminated,
    NotFound,
    AccessDenied,
    TimedOut,
}

impl KillOutcome {
    pub fn message(self, pid: u32) -> String {
        match self {
            KillOutcome::Terminated => format!("Terminated process with PID {pid}"),
            KillOutcome::NotFound => format!("No such process with PID {pid}"),
            KillOutcome::AccessDenied => format!("Cannot terminate PID {pid}: access denied"),
            KillOutcome::TimedOut => format!("Process PID {pid} did not terminate in time"),
        }
    }
}

/// Per-cycle collection diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    pub readable: usize,
    pub gone: usize,
    pub denied: usize,
    pub failed: usize,
}

impl CollectStats {
    pub fn skipped(&self) -> usize {
        self.gone + self.denied + self.failed
    }
}

/// Published output of one process refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessTable {
    pub rows: Vec<ProcessRecord>,
    /// Readable records before truncation.
    pub total: usize,
    pub sort: SortSpec,
    pub stats: CollectStats,
    pub captured_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parses_aliases_case_insensitively() {
        assert_eq!("CPU".parse::<SortKey>().unwrap(), SortKey::Cpu);
        assert_eq!("mem".parse::<SortKey>().unwrap(), SortKey::Memory);
        assert_eq!("net".parse::<SortKey>().unwrap(), SortKey::Network);
        assert!("threads".parse::<SortKey>().is_err());
    }

    #[test]
    fn sort_key_index_round_trips() {
        for k in SortKey::ALL {
            assert_eq!(SortKey::from_index(k.index()), Some(k));
        }
        assert_eq!(SortKey::from_index(7), None);
    }

    #[test]
    fn default_spec_is_cpu_descending() {
        assert_eq!(
            SortSpec::default(),
            SortSpec::new(SortKey::Cpu, SortDirection::Descending)
        );
        assert_eq!(SortSpec::for_key(SortKey::Name).direction, SortDirection::Ascending);
        assert_eq!(SortSpec::for_key(SortKey::Disk).direction, SortDirection::Descending);
    }

    #[test]
    fn kill_outcome_messages_name_the_pid() {
        assert!(KillOutcome::AccessDenied.message(42).contains("42"));
        assert!(KillOutcome::TimedOut.message(7).contains("did not terminate"));
    }

    #[test]
    fn host_snapshot_reports_mb() {
        let h = HostSnapshot {
            username: "u".into(),
            uptime: Duration::from_secs(1),
            physical_cores: None,
            logical_cores: 1,
            max_freq_ghz: None,
            current_freq_ghz: None,
            battery_percent: None,
            disk: None,
            process_count: 0,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            bytes_sent: 3 * 1024 * 1024,
            bytes_recv: 512 * 1024,
            connection_count: None,
        };
        assert!((h.sent_mb() - 3.0).abs() < f64::EPSILON);
        assert!((h.recv_mb() - 0.5).abs() < f64::EPSILON);
    }
}
