//! Host-wide metrics: CPU, memory, cores, clocks, disk, battery, network.
//!
//! Every sensor is best effort. A sensor that is missing or fails turns into an
//! absent field; `read` itself cannot fail.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use once_cell::sync::OnceCell;
use sysinfo::{
    Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users,
    MINIMUM_CPU_UPDATE_INTERVAL,
};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::sockets::SocketTable;
use crate::types::{DiskUsage, HostSnapshot, BYTES_PER_GB};

/// Anything that can produce a [`HostSnapshot`]. Reads may block.
pub trait HostProbe: Send {
    fn read(&mut self) -> HostSnapshot;
}

pub struct HostReader {
    sys: System,
    networks: Networks,
    disks: Disks,
    disk_mount: PathBuf,
    sample_window: Duration,
    username: String,
}

impl HostReader {
    /// `sample_window` is how long CPU utilization is measured per read; it is
    /// raised to the platform minimum when shorter.
    pub fn new(disk_mount: impl Into<PathBuf>, sample_window: Duration) -> Self {
        let mut sys = System::new();
        let username = current_username(&mut sys);
        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            disk_mount: disk_mount.into(),
            sample_window: sample_window.max(MINIMUM_CPU_UPDATE_INTERVAL),
            username,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.disk_mount.clone(), cfg.cpu_sample_window())
    }

    pub fn sample_window(&self) -> Duration {
        self.sample_window
    }

    // Blocks for the sample window: utilization only means something as a delta.
    fn sample_cpu(&mut self) -> f32 {
        self.sys.refresh_cpu_usage();
        thread::sleep(self.sample_window);
        self.sys.refresh_cpu_usage();
        self.sys.refresh_cpu_frequency();
        self.sys.global_cpu_usage().clamp(0.0, 100.0)
    }

    fn disk(&mut self) -> Option<DiskUsage> {
        self.disks.refresh(true);
        let found = disk_usage_for(
            &self.disk_mount,
            self.disks
                .list()
                .iter()
                .map(|d| (d.mount_point(), d.total_space(), d.available_space())),
        );
        if found.is_none() {
            debug!(
                path = %self.disk_mount.display(),
                "no mounted volume holds the configured disk path"
            );
        }
        found
    }

    fn network_totals(&mut self) -> (u64, u64) {
        self.networks.refresh(true);
        self.networks.iter().fold((0u64, 0u64), |(tx, rx), (_, data)| {
            (
                tx.saturating_add(data.total_transmitted()),
                rx.saturating_add(data.total_received()),
            )
        })
    }

    fn process_count(&mut self) -> usize {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().without_tasks(),
        );
        self.sys.processes().len()
    }
}

impl HostProbe for HostReader {
    fn read(&mut self) -> HostSnapshot {
        let cpu_percent = self.sample_cpu();

        let mut memory_percent = 0.0;
        let mut process_count = 0;
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sys.refresh_memory();
            let total = self.sys.total_memory();
            let used = total.saturating_sub(self.sys.available_memory());
            memory_percent = percent(used, total);
            process_count = self.process_count();
        })) {
            warn!("sysinfo memory/process refresh panicked: {e:?}");
        }

        let freqs: Vec<u64> = self.sys.cpus().iter().map(|c| c.frequency()).collect();
        let (bytes_sent, bytes_recv) = self.network_totals();

        HostSnapshot {
            username: self.username.clone(),
            uptime: Duration::from_secs(System::uptime()),
            physical_cores: System::physical_core_count(),
            logical_cores: self.sys.cpus().len(),
            max_freq_ghz: max_freq_ghz(),
            current_freq_ghz: mean_freq_ghz(&freqs),
            battery_percent: battery_percent(),
            disk: self.disk(),
            process_count,
            cpu_percent,
            memory_percent,
            bytes_sent,
            bytes_recv,
            connection_count: SocketTable::read().map(|t| t.len()),
        }
    }
}

/// `used / total` as a percentage in [0, 100]; 0 when total is unknown.
pub fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((used as f64 / total as f64) * 100.0).clamp(0.0, 100.0) as f32
}

/// Usage of the volume holding `path`: the disk whose mount point is the
/// longest component-wise prefix of it. Items are (mount point, total, available).
pub fn disk_usage_for<'a, I>(path: &Path, disks: I) -> Option<DiskUsage>
where
    I: IntoIterator<Item = (&'a Path, u64, u64)>,
{
    let (mount, total, available) = disks
        .into_iter()
        .filter(|(m, _, _)| path.starts_with(m))
        .max_by_key(|(m, _, _)| m.components().count())?;
    let used = total.saturating_sub(available);
    Some(DiskUsage {
        mount: mount.display().to_string(),
        used_percent: f64::from(percent(used, total)),
        total_gb: total as f64 / BYTES_PER_GB,
    })
}

/// Mean of the per-core clocks (MHz) in GHz. Cores reporting 0 could not be read.
pub fn mean_freq_ghz(mhz: &[u64]) -> Option<f64> {
    let known: Vec<u64> = mhz.iter().copied().filter(|&f| f > 0).collect();
    if known.is_empty() {
        return None;
    }
    let sum: u64 = known.iter().sum();
    Some(sum as f64 / known.len() as f64 / 1000.0)
}

// The rated maximum never changes while we run; read it once.
fn max_freq_ghz() -> Option<f64> {
    static MAX: OnceCell<Option<f64>> = OnceCell::new();
    *MAX.get_or_init(read_max_freq_ghz)
}

#[cfg(target_os = "linux")]
fn read_max_freq_ghz() -> Option<f64> {
    let s =
        std::fs::read_to_string("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq").ok()?;
    parse_khz_as_ghz(&s)
}

#[cfg(not(target_os = "linux"))]
fn read_max_freq_ghz() -> Option<f64> {
    None
}

fn parse_khz_as_ghz(s: &str) -> Option<f64> {
    let khz: u64 = s.trim().parse().ok()?;
    (khz > 0).then(|| khz as f64 / 1_000_000.0)
}

fn battery_percent() -> Option<f32> {
    use battery::units::ratio::percent as pct;

    let manager = battery::Manager::new().ok()?;
    let mut batteries = manager.batteries().ok()?;
    let b = batteries.find_map(|b| b.ok())?;
    Some(b.state_of_charge().get::<pct>().clamp(0.0, 100.0))
}

fn current_username(sys: &mut System) -> String {
    let from_os = sysinfo::get_current_pid().ok().and_then(|pid| {
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            false,
            ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
        );
        let uid = sys.process(pid)?.user_id()?.clone();
        let users = Users::new_with_refreshed_list();
        users.get_user_by_id(&uid).map(|u| u.name().to_string())
    });
    from_os
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "unknown".into())
}
