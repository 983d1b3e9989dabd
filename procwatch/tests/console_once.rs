//! End-to-end run of the console front end against the live host.
use assert_cmd::Command;
use serde_json::Value;

#[test]
fn once_prints_a_single_json_frame() {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("procwatch")
        .unwrap()
        .env("XDG_CONFIG_HOME", td.path())
        .args([
            "--mode",
            "console",
            "--format",
            "json",
            "--once",
            "--cpu-sample-ms",
            "200",
            "-n",
            "5",
            "--log-level",
            "error",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    let v: Value = serde_json::from_str(lines[0]).unwrap();

    let rows = v["table"]["rows"].as_array().unwrap();
    assert!(!rows.is_empty() && rows.len() <= 5);
    let cpus: Vec<f64> = rows
        .iter()
        .map(|r| r["cpu_percent"].as_f64().unwrap())
        .collect();
    assert!(cpus.windows(2).all(|w| w[0] >= w[1]), "{cpus:?}");
    assert!(v["host"]["logical_cores"].as_u64().unwrap() >= 1);
}

#[test]
fn once_text_output_has_table_header() {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("procwatch")
        .unwrap()
        .env("XDG_CONFIG_HOME", td.path())
        .args(["--mode", "console", "--once", "--cpu-sample-ms", "200", "--sort", "pid"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("sorted on PID ▲"), "{text}");
    assert!(text.contains("PID ▲") && text.contains("CPU %"), "{text}");
}
