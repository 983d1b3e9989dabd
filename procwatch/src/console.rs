//! Scrolling console front end: prints each new process table with the latest
//! host metrics, as text or one JSON object per line.

use std::io::Write;

use chrono::{DateTime, Local};
use procwatch_engine::{HostSnapshot, KillOutcome, ProcessTable, SortSpec};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::presenter::{Intent, Presenter};
use crate::ui::processes::header_titles;
use crate::ui::util::{
    fmt_count, fmt_disk, fmt_ghz, fmt_pct, fmt_sort, fmt_uptime, truncate_middle,
};

const NAME_WIDTH: usize = 28;

#[derive(Serialize)]
struct Frame<'a> {
    host: &'a HostSnapshot,
    table: &'a ProcessTable,
}

pub struct Console<W: Write> {
    out: W,
    format: OutputFormat,
    once: bool,
    last_printed: Option<DateTime<Local>>,
    done: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, format: OutputFormat, once: bool) -> Self {
        Self {
            out,
            format,
            once,
            last_printed: None,
            done: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, h: &HostSnapshot, t: &ProcessTable) -> std::io::Result<()> {
        let out = &mut self.out;
        writeln!(
            out,
            "== procwatch {} | sorted on {} ==",
            t.captured_at.format("%Y-%m-%d %H:%M:%S"),
            fmt_sort(t.sort)
        )?;
        writeln!(
            out,
            "user {} | up {} | cores {} physical / {} logical | freq {} (max {}) | battery {}",
            h.username,
            fmt_uptime(h.uptime),
            fmt_count(h.physical_cores),
            h.logical_cores,
            fmt_ghz(h.current_freq_ghz),
            fmt_ghz(h.max_freq_ghz),
            fmt_pct(h.battery_percent),
        )?;
        writeln!(
            out,
            "cpu {:.1}% | mem {:.1}% | disk {} | processes {} | net sent {:.2} MB recv {:.2} MB | connections {}",
            h.cpu_percent,
            h.memory_percent,
            fmt_disk(h),
            h.process_count,
            h.sent_mb(),
            h.recv_mb(),
            fmt_count(h.connection_count),
        )?;

        let titles = header_titles(t.sort);
        writeln!(
            out,
            "{:>7} {:<w$} {:<9} {:>8} {:>10} {:>10} {:>5}",
            titles[0],
            titles[1],
            titles[2],
            titles[3],
            titles[4],
            titles[5],
            titles[6],
            w = NAME_WIDTH
        )?;
        for p in &t.rows {
            writeln!(
                out,
                "{:>7} {:<w$} {:<9} {:>8.1} {:>10.1} {:>10.1} {:>5}",
                p.pid,
                truncate_middle(&p.name, NAME_WIDTH),
                p.status.as_str(),
                p.cpu_percent,
                p.memory_rss_mb,
                p.disk_read_mb,
                p.connection_count,
                w = NAME_WIDTH
            )?;
        }
        if t.stats.skipped() > 0 {
            writeln!(
                out,
                "({} of {} shown, {} unreadable)",
                t.rows.len(),
                t.total,
                t.stats.skipped()
            )?;
        }
        writeln!(out)
    }
}

impl<W: Write> Presenter for Console<W> {
    fn render(
        &mut self,
        host: Option<&HostSnapshot>,
        table: Option<&ProcessTable>,
        _sort: SortSpec,
    ) -> anyhow::Result<()> {
        // Print once per process cycle, after the first host read.
        let (Some(h), Some(t)) = (host, table) else {
            return Ok(());
        };
        if self.done || self.last_printed == Some(t.captured_at) {
            return Ok(());
        }
        match self.format {
            OutputFormat::Text => self.write_text(h, t)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &Frame { host: h, table: t })?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        self.last_printed = Some(t.captured_at);
        self.done = self.once;
        Ok(())
    }

    fn next_intent(&mut self) -> anyhow::Result<Option<Intent>> {
        Ok(self.done.then_some(Intent::Quit))
    }

    fn show_outcome(&mut self, pid: u32, outcome: KillOutcome) -> anyhow::Result<()> {
        writeln!(self.out, "{}", outcome.message(pid))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procwatch_engine::{CollectStats, ProcessRecord, ProcessStatus};
    use std::time::Duration;

    fn host() -> HostSnapshot {
        HostSnapshot {
            username: "alice".into(),
            uptime: Duration::from_secs(90_061),
            physical_cores: None,
            logical_cores: 8,
            max_freq_ghz: Some(3.6),
            current_freq_ghz: Some(2.4),
            battery_percent: None,
            disk: None,
            process_count: 2,
            cpu_percent: 12.5,
            memory_percent: 40.0,
            bytes_sent: 0,
            bytes_recv: 0,
            connection_count: None,
        }
    }

    fn table() -> ProcessTable {
        ProcessTable {
            rows: vec![ProcessRecord {
                pid: 42,
                name: "postgres".into(),
                status: ProcessStatus::Sleeping,
                cpu_percent: 3.25,
                memory_rss_mb: 128.0,
                disk_read_mb: 9.5,
                connection_count: 4,
            }],
            total: 2,
            sort: SortSpec::default(),
            stats: CollectStats {
                readable: 2,
                gone: 1,
                denied: 0,
                failed: 0,
            },
            captured_at: Local::now(),
        }
    }

    #[test]
    fn waits_for_both_streams() {
        let mut c = Console::new(Vec::new(), OutputFormat::Text, true);
        c.render(None, Some(&table()), SortSpec::default()).unwrap();
        assert_eq!(c.next_intent().unwrap(), None);
        assert!(c.into_inner().is_empty());
    }

    #[test]
    fn text_frame_prints_each_table_once() {
        let mut c = Console::new(Vec::new(), OutputFormat::Text, false);
        let (h, t) = (host(), table());
        c.render(Some(&h), Some(&t), SortSpec::default()).unwrap();
        c.render(Some(&h), Some(&t), SortSpec::default()).unwrap();
        assert_eq!(c.next_intent().unwrap(), None);

        let text = String::from_utf8(c.into_inner()).unwrap();
        assert_eq!(text.matches("== procwatch").count(), 1);
        assert!(text.contains("user alice | up 1d 01:01:01"));
        assert!(text.contains("cores N/A physical / 8 logical"));
        assert!(text.contains("CPU % ▼"));
        assert!(text.contains("postgres"));
        assert!(text.contains("(1 of 2 shown, 1 unreadable)"));
    }

    #[test]
    fn once_quits_after_first_json_frame() {
        let mut c = Console::new(Vec::new(), OutputFormat::Json, true);
        c.render(Some(&host()), Some(&table()), SortSpec::default())
            .unwrap();
        assert_eq!(c.next_intent().unwrap(), Some(Intent::Quit));

        let text = String::from_utf8(c.into_inner()).unwrap();
        let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(v["host"]["username"], "alice");
        assert_eq!(v["table"]["rows"][0]["pid"], 42);
        assert_eq!(v["table"]["rows"][0]["status"], "sleeping");
        assert_eq!(v["table"]["sort"]["key"], "cpu");
    }
}
