#![cfg(unix)]

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use procwatch_engine::{terminate, KillOutcome};

fn spawn(cmd: &str, args: &[&str]) -> std::process::Child {
    Command::new(cmd)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn child")
}

#[test]
fn sleeping_child_is_terminated() {
    let mut child = spawn("sleep", &["30"]);
    let pid = child.id();

    assert_eq!(terminate(pid, Duration::from_secs(3)), KillOutcome::Terminated);
    // exited but not yet reaped: a zombie is not a live target
    assert_eq!(terminate(pid, Duration::from_secs(1)), KillOutcome::NotFound);

    child.wait().unwrap();
    assert_eq!(terminate(pid, Duration::from_secs(1)), KillOutcome::NotFound);
}

#[test]
fn enormous_wait_is_accepted() {
    let mut child = spawn("sleep", &["30"]);
    let pid = child.id();

    assert_eq!(terminate(pid, Duration::MAX), KillOutcome::Terminated);
    child.wait().unwrap();
}

#[test]
fn zero_wait_still_sends_the_signal() {
    let mut child = spawn("sleep", &["30"]);
    let pid = child.id();

    let outcome = terminate(pid, Duration::ZERO);
    assert!(
        matches!(outcome, KillOutcome::Terminated | KillOutcome::TimedOut),
        "{outcome:?}"
    );
    let status = child.wait().unwrap();
    assert!(!status.success());
}

#[test]
fn ignored_signal_times_out_without_escalation() {
    let mut child = spawn("sh", &["-c", "trap '' TERM; sleep 30"]);
    let pid = child.id();
    // let the shell install its trap
    thread::sleep(Duration::from_millis(300));

    assert_eq!(terminate(pid, Duration::from_millis(300)), KillOutcome::TimedOut);
    assert!(child.try_wait().unwrap().is_none(), "process must still be running");

    child.kill().unwrap();
    child.wait().unwrap();
}
