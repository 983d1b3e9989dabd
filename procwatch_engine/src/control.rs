//! Graceful process termination with a bounded wait.
//!
//! One call sends at most one signal. The process is never escalated to a
//! forced kill: a `TimedOut` outcome leaves it running and the caller decides
//! what to do next.

use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::types::KillOutcome;

/// pids above this wrap to negative `pid_t` values, which POSIX treats as
/// process-group or broadcast targets.
pub const MAX_SAFE_PID: u32 = i32::MAX as u32;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Ask `pid` to exit and wait up to `wait_timeout` for it to go away.
pub fn terminate(pid: u32, wait_timeout: Duration) -> KillOutcome {
    if pid == 0 || pid > MAX_SAFE_PID {
        debug!(pid, "refusing to signal reserved pid");
        return KillOutcome::NotFound;
    }

    let mut sys = System::new();
    let target = Pid::from_u32(pid);
    if !is_alive(&mut sys, target) {
        debug!(pid, "terminate: no such process");
        return KillOutcome::NotFound;
    }

    if let Err(outcome) = send_term(&sys, pid) {
        debug!(pid, ?outcome, "terminate: signal not delivered");
        return outcome;
    }
    info!(pid, timeout_ms = wait_timeout.as_millis() as u64, "sent termination signal");

    let outcome = wait_for_exit(&mut sys, target, wait_timeout);
    info!(pid, ?outcome, "terminate finished");
    outcome
}

// Zombies and dead entries still occupy the table but are not running.
fn is_alive(sys: &mut System, pid: Pid) -> bool {
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    match sys.process(pid) {
        Some(p) => !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
        None => false,
    }
}

// A wait too large to represent as an Instant has no deadline.
fn wait_for_exit(sys: &mut System, pid: Pid, wait_timeout: Duration) -> KillOutcome {
    let deadline = Instant::now().checked_add(wait_timeout);
    loop {
        if !is_alive(sys, pid) {
            return KillOutcome::Terminated;
        }
        let now = Instant::now();
        let nap = match deadline {
            Some(d) if now >= d => return KillOutcome::TimedOut,
            Some(d) => POLL_INTERVAL.min(d - now),
            None => POLL_INTERVAL,
        };
        thread::sleep(nap);
    }
}

#[cfg(unix)]
fn send_term(_sys: &System, pid: u32) -> Result<(), KillOutcome> {
    // pid is validated non-zero and <= i32::MAX above
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    Err(outcome_for_errno(err.raw_os_error().unwrap_or(0), pid))
}

/// Map a failed `kill(2)` to an outcome.
#[cfg(unix)]
fn outcome_for_errno(errno: i32, pid: u32) -> KillOutcome {
    match errno {
        libc::EPERM => KillOutcome::AccessDenied,
        libc::ESRCH => KillOutcome::NotFound,
        other => {
            warn!(pid, errno = other, "kill failed unexpectedly");
            KillOutcome::AccessDenied
        }
    }
}

#[cfg(not(unix))]
fn send_term(sys: &System, pid: u32) -> Result<(), KillOutcome> {
    let Some(p) = sys.process(Pid::from_u32(pid)) else {
        return Err(KillOutcome::NotFound);
    };
    // Platforms without a graceful signal fall back to their native terminate.
    let sent = p
        .kill_with(sysinfo::Signal::Term)
        .unwrap_or_else(|| p.kill());
    if sent {
        Ok(())
    } else {
        warn!(pid, "platform refused to terminate process");
        Err(KillOutcome::AccessDenied)
    }
}
