//! Engine configuration: refresh cadence, window size, disk volume, kill bound.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{SortDirection, SortKey, SortSpec};

#[cfg(windows)]
const DEFAULT_DISK_MOUNT: &str = "C:\\";
#[cfg(not(windows))]
const DEFAULT_DISK_MOUNT: &str = "/";

/// Longest accepted wait for a killed process, in seconds.
pub const MAX_KILL_TIMEOUT_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Seconds between host metric reads.
    pub host_interval_secs: u64,
    /// Seconds between process snapshots.
    pub process_interval_secs: u64,
    /// Rows kept after ranking.
    pub row_limit: usize,
    /// A path on the volume reported as disk usage.
    pub disk_mount: PathBuf,
    /// Length of the blocking CPU sample window, in milliseconds.
    pub cpu_sample_ms: u64,
    /// How long a kill request waits for the process to exit.
    pub kill_timeout_secs: f64,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host_interval_secs: 1,
            process_interval_secs: 8,
            row_limit: 50,
            disk_mount: PathBuf::from(DEFAULT_DISK_MOUNT),
            cpu_sample_ms: 1000,
            kill_timeout_secs: 3.0,
            sort_key: SortKey::Cpu,
            sort_direction: SortDirection::Descending,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.host_interval_secs == 0 {
            return Err(EngineError::invalid_config("host_interval_secs must be > 0"));
        }
        if self.process_interval_secs == 0 {
            return Err(EngineError::invalid_config(
                "process_interval_secs must be > 0",
            ));
        }
        if self.row_limit == 0 {
            return Err(EngineError::invalid_config("row_limit must be > 0"));
        }
        if !(0.0..=MAX_KILL_TIMEOUT_SECS).contains(&self.kill_timeout_secs) {
            return Err(EngineError::invalid_config(format!(
                "kill_timeout_secs must be between 0 and {MAX_KILL_TIMEOUT_SECS}, got {}",
                self.kill_timeout_secs
            )));
        }
        if self.disk_mount.as_os_str().is_empty() {
            return Err(EngineError::invalid_config("disk_mount must not be empty"));
        }
        Ok(())
    }

    pub fn host_interval(&self) -> Duration {
        Duration::from_secs(self.host_interval_secs)
    }

    pub fn process_interval(&self) -> Duration {
        Duration::from_secs(self.process_interval_secs)
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    /// Clamped to `[0, MAX_KILL_TIMEOUT_SECS]`; NaN counts as zero.
    pub fn kill_timeout(&self) -> Duration {
        let secs = if self.kill_timeout_secs.is_nan() {
            0.0
        } else {
            self.kill_timeout_secs.clamp(0.0, MAX_KILL_TIMEOUT_SECS)
        };
        Duration::from_secs_f64(secs)
    }

    pub fn initial_sort(&self) -> SortSpec {
        SortSpec::new(self.sort_key, self.sort_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = EngineConfig::default();
        c.validate().unwrap();
        assert_eq!(c.process_interval(), Duration::from_secs(8));
        assert_eq!(c.kill_timeout(), Duration::from_secs(3));
        assert_eq!(c.initial_sort(), SortSpec::default());
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut c = EngineConfig::default();
        c.row_limit = 0;
        assert!(c.validate().unwrap_err().to_string().contains("row_limit"));

        let mut c = EngineConfig::default();
        c.host_interval_secs = 0;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.kill_timeout_secs = f64::NAN;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.kill_timeout_secs = 0.0;
        c.validate().unwrap();
    }

    #[test]
    fn huge_kill_timeout_is_rejected_and_never_panics() {
        let mut c = EngineConfig::default();
        c.kill_timeout_secs = 1e20;
        assert!(c
            .validate()
            .unwrap_err()
            .to_string()
            .contains("kill_timeout_secs"));
        assert_eq!(
            c.kill_timeout(),
            Duration::from_secs_f64(MAX_KILL_TIMEOUT_SECS)
        );

        c.kill_timeout_secs = f64::INFINITY;
        assert!(c.validate().is_err());
        assert_eq!(
            c.kill_timeout(),
            Duration::from_secs_f64(MAX_KILL_TIMEOUT_SECS)
        );

        c.kill_timeout_secs = f64::NAN;
        assert_eq!(c.kill_timeout(), Duration::ZERO);

        c.kill_timeout_secs = MAX_KILL_TIMEOUT_SECS;
        c.validate().unwrap();
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let c: EngineConfig =
            serde_json::from_str(r#"{ "row_limit": 20, "sort_key": "memory" }"#).unwrap();
        assert_eq!(c.row_limit, 20);
        assert_eq!(c.sort_key, SortKey::Memory);
        assert_eq!(c.process_interval_secs, 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let r = serde_json::from_str::<EngineConfig>(r#"{ "rows": 20 }"#);
        assert!(r.is_err());
    }
}
