//! tracing-subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, LogFormat, Mode};

/// Install the global subscriber for this run.
///
/// Logs go to `--log-file` when given. Otherwise console mode logs to stderr
/// and the TUI logs nowhere, since stderr shares the terminal it draws on.
pub fn init(cli: &Cli) -> anyhow::Result<()> {
    match (&cli.log_file, cli.mode) {
        (Some(path), _) => init_file(path, cli.log_level, cli.log_format),
        (None, Mode::Console) => {
            init_with(std::io::stderr, cli.log_level, cli.log_format);
            Ok(())
        }
        (None, Mode::Tui) => Ok(()),
    }
}

fn init_file(path: &Path, level: tracing::Level, format: LogFormat) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    init_with(Mutex::new(file), level, format);
    Ok(())
}

fn init_with<W>(writer: W, level: tracing::Level, format: LogFormat)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(writer))
            .with(filter)
            .try_init(),
    };
}
