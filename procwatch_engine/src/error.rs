//! Error taxonomy for sampling and engine setup.
//!
//! Read failures never reach the presentation layer: the collector drops the
//! affected record and the host reader turns them into absent fields.

use std::io;
use thiserror::Error;

/// Why a single field of a process or host sensor could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The process exited between enumeration and the field read.
    #[error("process {pid} no longer exists")]
    ProcessGone { pid: u32 },

    #[error("access denied reading process {pid}")]
    AccessDenied { pid: u32 },

    /// The host has no such sensor, or the platform does not expose it.
    #[error("sensor '{sensor}' unavailable")]
    SensorUnavailable { sensor: &'static str },

    #[error("{message}")]
    Other { message: String },
}

impl ReadError {
    /// Classify an I/O failure that happened while reading `/proc/<pid>/...`.
    pub fn from_io(e: &io::Error, pid: u32) -> ReadError {
        match e.kind() {
            io::ErrorKind::NotFound => ReadError::ProcessGone { pid },
            io::ErrorKind::PermissionDenied => ReadError::AccessDenied { pid },
            // ESRCH surfaces when the task vanished while its fd table was walked
            #[cfg(unix)]
            _ if e.raw_os_error() == Some(libc::ESRCH) => ReadError::ProcessGone { pid },
            _ => ReadError::Other {
                message: format!("pid {pid}: {e}"),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("the refresh scheduler must be started inside a tokio runtime")]
    NoRuntime,
}

impl EngineError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSortError {
    #[error("unknown sort key '{0}' (expected pid, name, status, cpu, memory, disk or network)")]
    Key(String),

    #[error("unknown sort direction '{0}' (expected asc or desc)")]
    Direction(String),
}
