//! Command line: front end selection, logging, and per-run config overrides.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use procwatch_engine::{EngineConfig, SortDirection, SortKey};

use crate::config_file::{self, load_config};

/// Local process monitor with sortable columns and a kill action.
#[derive(Parser, Debug)]
#[command(name = "procwatch", version, about, long_about = None)]
pub struct Cli {
    /// Front end to run.
    #[arg(long, value_enum, default_value_t = Mode::Tui, env = "PROCWATCH_MODE")]
    pub mode: Mode,

    /// Output format for console mode.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "PROCWATCH_FORMAT")]
    pub format: OutputFormat,

    /// Print a single refresh and exit (console mode).
    #[arg(long)]
    pub once: bool,

    /// Config file to use instead of the default location.
    #[arg(short, long, value_name = "PATH", env = "PROCWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds between host metric reads.
    #[arg(long, value_name = "SECS", env = "PROCWATCH_HOST_INTERVAL")]
    pub host_interval: Option<u64>,

    /// Seconds between process snapshots.
    #[arg(long, value_name = "SECS", env = "PROCWATCH_PROCESS_INTERVAL")]
    pub process_interval: Option<u64>,

    /// Number of process rows to keep.
    #[arg(short = 'n', long, value_name = "N", env = "PROCWATCH_ROWS")]
    pub rows: Option<usize>,

    /// Any path on the volume to report as disk usage.
    #[arg(long, value_name = "PATH", env = "PROCWATCH_DISK_MOUNT")]
    pub disk_mount: Option<PathBuf>,

    /// Length of the CPU sample window in milliseconds.
    #[arg(long, value_name = "MS", env = "PROCWATCH_CPU_SAMPLE_MS")]
    pub cpu_sample_ms: Option<u64>,

    /// Seconds to wait for a killed process to exit.
    #[arg(long, value_name = "SECS", env = "PROCWATCH_KILL_TIMEOUT")]
    pub kill_timeout: Option<f64>,

    /// Initial sort column: pid, name, status, cpu, memory, disk, network.
    #[arg(short, long, value_name = "KEY", env = "PROCWATCH_SORT")]
    pub sort: Option<SortKey>,

    /// Initial sort direction: asc or desc. Defaults to the column's natural direction.
    #[arg(long, value_name = "DIR", env = "PROCWATCH_SORT_DIR")]
    pub sort_dir: Option<SortDirection>,

    /// The minimum log level to record.
    #[arg(long, value_name = "LEVEL", default_value = "info", env = "PROCWATCH_LOG_LEVEL")]
    pub log_level: tracing::Level,

    /// The format for log output.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "PROCWATCH_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Write logs to this file. Required for any logging in TUI mode.
    #[arg(long, value_name = "PATH", env = "PROCWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    pub save_config: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Full-screen terminal UI.
    Tui,
    /// Print each refresh to stdout.
    Console,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// One JSON object per refresh.
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file::config_path)
    }

    /// Overlay flags (and their env fallbacks) onto `cfg`.
    pub fn apply(&self, cfg: &mut EngineConfig) {
        if let Some(v) = self.host_interval {
            cfg.host_interval_secs = v;
        }
        if let Some(v) = self.process_interval {
            cfg.process_interval_secs = v;
        }
        if let Some(v) = self.rows {
            cfg.row_limit = v;
        }
        if let Some(v) = &self.disk_mount {
            cfg.disk_mount = v.clone();
        }
        if let Some(v) = self.cpu_sample_ms {
            cfg.cpu_sample_ms = v;
        }
        if let Some(v) = self.kill_timeout {
            cfg.kill_timeout_secs = v;
        }
        if let Some(k) = self.sort {
            cfg.sort_key = k;
            cfg.sort_direction = k.default_direction();
        }
        if let Some(d) = self.sort_dir {
            cfg.sort_direction = d;
        }
    }

    /// Defaults, then the config file, then env and flags. The result is validated.
    pub fn resolve_config(&self) -> anyhow::Result<EngineConfig> {
        let mut cfg = load_config(&self.config_path())?;
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("procwatch").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let cli = parse(&[]);
        let mut cfg = EngineConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cli.mode, Mode::Tui);
        assert_eq!(cli.log_level, tracing::Level::INFO);
    }

    #[test]
    fn sort_flag_brings_its_natural_direction() {
        let mut cfg = EngineConfig::default();
        parse(&["--sort", "name"]).apply(&mut cfg);
        assert_eq!(cfg.sort_key, SortKey::Name);
        assert_eq!(cfg.sort_direction, SortDirection::Ascending);

        let mut cfg = EngineConfig::default();
        parse(&["-s", "MEM", "--sort-dir", "asc"]).apply(&mut cfg);
        assert_eq!(cfg.sort_key, SortKey::Memory);
        assert_eq!(cfg.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn numeric_overrides() {
        let mut cfg = EngineConfig::default();
        parse(&[
            "-n",
            "10",
            "--process-interval",
            "2",
            "--kill-timeout",
            "0.5",
            "--disk-mount",
            "/home",
        ])
        .apply(&mut cfg);
        assert_eq!(cfg.row_limit, 10);
        assert_eq!(cfg.process_interval_secs, 2);
        assert_eq!(cfg.kill_timeout_secs, 0.5);
        assert_eq!(cfg.disk_mount, PathBuf::from("/home"));
    }

    #[test]
    fn bad_values_are_rejected_by_the_parser() {
        let args = ["procwatch", "--sort", "colour"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["procwatch", "--mode", "gui"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
