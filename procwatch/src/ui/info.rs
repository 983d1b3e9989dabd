//! System info panel: two label/value columns built from the latest host snapshot.

use procwatch_engine::{HostSnapshot, SortSpec};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme::LABEL;
use crate::ui::util::{fmt_count, fmt_disk, fmt_ghz, fmt_pct, fmt_sort, fmt_uptime};

/// Height the panel needs: rows per column plus borders.
pub const INFO_HEIGHT: u16 = 9;

fn row(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<18}"),
            Style::default().fg(LABEL).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

pub fn info_lines(h: &HostSnapshot, sort: SortSpec) -> (Vec<Line<'static>>, Vec<Line<'static>>) {
    let left = vec![
        row("Username:", h.username.clone(), Color::White),
        row("Uptime:", fmt_uptime(h.uptime), Color::White),
        row("Physical Cores:", fmt_count(h.physical_cores), Color::White),
        row("Logical Cores:", h.logical_cores.to_string(), Color::White),
        row("Max Frequency:", fmt_ghz(h.max_freq_ghz), Color::White),
        row("Cur Frequency:", fmt_ghz(h.current_freq_ghz), Color::White),
        row("Battery:", fmt_pct(h.battery_percent), Color::Green),
    ];
    let right = vec![
        row("Sorted on:", fmt_sort(sort), Color::White),
        row("Total Processes:", h.process_count.to_string(), Color::White),
        row("CPU Usage:", format!("{:.1}%", h.cpu_percent), Color::Yellow),
        row("Memory Used:", format!("{:.1}%", h.memory_percent), Color::Yellow),
        row("Disk Used:", fmt_disk(h), Color::Yellow),
        row(
            "Net Sent/Recv:",
            format!("{:.2} MB / {:.2} MB", h.sent_mb(), h.recv_mb()),
            Color::Green,
        ),
        row("Connections:", fmt_count(h.connection_count), Color::White),
    ];
    (left, right)
}

pub fn draw_info(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    h: Option<&HostSnapshot>,
    sort: SortSpec,
) {
    let block = Block::default().borders(Borders::ALL).title("System Info");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(h) = h else {
        f.render_widget(Paragraph::new("waiting for first sample..."), inner);
        return;
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);
    let (left, right) = info_lines(h, sort);
    f.render_widget(Paragraph::new(left), cols[0]);
    f.render_widget(Paragraph::new(right), cols[1]);
}
