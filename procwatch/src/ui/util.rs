//! Small formatting helpers shared by the TUI and the console printer.

use std::time::Duration;

use procwatch_engine::{HostSnapshot, SortDirection, SortSpec};

/// `3d 04:05:06`, or `04:05:06` under a day.
pub fn fmt_uptime(d: Duration) -> String {
    let s = d.as_secs();
    let (days, rem) = (s / 86_400, s % 86_400);
    let hms = format!("{:02}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    if days > 0 {
        format!("{days}d {hms}")
    } else {
        hms
    }
}

pub fn fmt_ghz(v: Option<f64>) -> String {
    v.map(|g| format!("{g:.2} GHz")).unwrap_or_else(|| "N/A".into())
}

pub fn fmt_pct(v: Option<f32>) -> String {
    v.map(|p| format!("{p:.0}%")).unwrap_or_else(|| "N/A".into())
}

pub fn fmt_count<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|c| c.to_string()).unwrap_or_else(|| "N/A".into())
}

pub fn fmt_disk(h: &HostSnapshot) -> String {
    match &h.disk {
        Some(d) => format!(
            "{:.1}% of {:.1} GB ({})",
            d.used_percent, d.total_gb, d.mount
        ),
        None => "N/A".into(),
    }
}

pub fn arrow(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    }
}

pub fn fmt_sort(spec: SortSpec) -> String {
    format!("{} {}", spec.key.as_str().to_ascii_uppercase(), arrow(spec.direction))
}

/// Cut `s` to at most `max` characters, marking the cut in the middle.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}
