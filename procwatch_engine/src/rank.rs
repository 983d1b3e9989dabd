//! Ranking and windowing of a snapshot.
//!
//! Ordering rules:
//! - numeric keys use a total order (`total_cmp`), so NaN can never make the
//!   comparator inconsistent;
//! - name and status compare byte-wise, case-sensitive, on the raw OS strings
//!   (status by its lowercase label);
//! - the sort is stable and direction is applied inside the comparator, so rows
//!   that tie keep their snapshot order in both directions;
//! - truncation happens after sorting.

use std::cmp::Ordering;

use crate::types::{ProcessRecord, SortDirection, SortKey, SortSpec};

/// Compare two records on `key`, ascending.
pub fn compare_by(key: SortKey, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    match key {
        SortKey::Pid => a.pid.cmp(&b.pid),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
        SortKey::Memory => a.memory_rss_mb.total_cmp(&b.memory_rss_mb),
        SortKey::Disk => a.disk_read_mb.total_cmp(&b.disk_read_mb),
        SortKey::Network => a.connection_count.cmp(&b.connection_count),
    }
}

/// Comparator with direction folded in.
pub fn comparator(spec: SortSpec) -> impl Fn(&ProcessRecord, &ProcessRecord) -> Ordering {
    move |a, b| {
        let o = compare_by(spec.key, a, b);
        match spec.direction {
            SortDirection::Ascending => o,
            SortDirection::Descending => o.reverse(),
        }
    }
}

/// Sort `snapshot` by `spec` and keep at most `limit` rows.
pub fn rank(
    mut snapshot: Vec<ProcessRecord>,
    spec: SortSpec,
    limit: usize,
) -> Vec<ProcessRecord> {
    // sort_by is stable; do not switch to sort_unstable_by
    snapshot.sort_by(comparator(spec));
    snapshot.truncate(limit);
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessStatus;

    fn rec(pid: u32, name: &str, cpu: f32) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.into(),
            status: ProcessStatus::Sleeping,
            cpu_percent: cpu,
            memory_rss_mb: 0.0,
            disk_read_mb: 0.0,
            connection_count: 0,
        }
    }

    fn pids(rows: &[ProcessRecord]) -> Vec<u32> {
        rows.iter().map(|r| r.pid).collect()
    }

    #[test]
    fn cpu_desc_keeps_ties_in_input_order() {
        let s = vec![rec(1, "a", 50.0), rec(2, "b", 90.0), rec(3, "c", 50.0)];
        let out = rank(s, SortSpec::new(SortKey::Cpu, SortDirection::Descending), 2);
        assert_eq!(pids(&out), vec![2, 1]);
    }

    #[test]
    fn ascending_also_keeps_ties_in_input_order() {
        let s = vec![rec(1, "a", 50.0), rec(2, "b", 90.0), rec(3, "c", 50.0)];
        let out = rank(s, SortSpec::new(SortKey::Cpu, SortDirection::Ascending), 10);
        assert_eq!(pids(&out), vec![1, 3, 2]);
    }

    #[test]
    fn name_is_case_sensitive() {
        let s = vec![rec(1, "bash", 0.0), rec(2, "Xorg", 0.0), rec(3, "agetty", 0.0)];
        let out = rank(s, SortSpec::new(SortKey::Name, SortDirection::Ascending), 10);
        // uppercase sorts before lowercase in byte order
        assert_eq!(pids(&out), vec![2, 3, 1]);
    }

    #[test]
    fn status_sorts_by_label() {
        let mut a = rec(1, "a", 0.0);
        a.status = ProcessStatus::Zombie;
        let mut b = rec(2, "b", 0.0);
        b.status = ProcessStatus::Running;
        let mut c = rec(3, "c", 0.0);
        c.status = ProcessStatus::Sleeping;
        let out = rank(vec![a, b, c], SortSpec::for_key(SortKey::Status), 10);
        assert_eq!(pids(&out), vec![2, 3, 1]);
    }

    #[test]
    fn nan_cpu_does_not_break_ordering() {
        let s = vec![rec(1, "a", f32::NAN), rec(2, "b", 1.0), rec(3, "c", 0.0)];
        let out = rank(s, SortSpec::new(SortKey::Cpu, SortDirection::Ascending), 10);
        assert_eq!(pids(&out), vec![3, 2, 1]);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        let s = vec![rec(1, "a", 1.0)];
        assert!(rank(s, SortSpec::default(), 0).is_empty());
    }
}
