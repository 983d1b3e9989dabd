//! Process table with per-cell coloring, sort indicator and a selectable row.

use procwatch_engine::{ProcessTable, SortKey, SortSpec};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::ui::theme::{cpu_color, mem_color, HEADER, SELECTED_BG};
use crate::ui::util::{arrow, truncate_middle};

const COLS: [Constraint; 7] = [
    Constraint::Length(8),  // PID
    Constraint::Min(16),    // Name
    Constraint::Length(9),  // Status
    Constraint::Length(8),  // CPU %
    Constraint::Length(10), // Mem MB
    Constraint::Length(10), // Disk MB
    Constraint::Length(5),  // Net
];

const TITLES: [(&str, SortKey); 7] = [
    ("PID", SortKey::Pid),
    ("Name", SortKey::Name),
    ("Status", SortKey::Status),
    ("CPU %", SortKey::Cpu),
    ("Mem MB", SortKey::Memory),
    ("Disk MB", SortKey::Disk),
    ("Net", SortKey::Network),
];

const NAME_MAX: usize = 40;

/// Column titles, marking the column the table was ranked by.
pub fn header_titles(sort: SortSpec) -> Vec<String> {
    TITLES
        .iter()
        .map(|&(t, k)| {
            if k == sort.key {
                format!("{t} {}", arrow(sort.direction))
            } else {
                t.to_string()
            }
        })
        .collect()
}

pub fn draw_processes(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    t: Option<&ProcessTable>,
    state: &mut TableState,
) {
    let Some(t) = t else {
        f.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title("Processes (sampling...)"),
            area,
        );
        return;
    };

    let mut title = format!("Processes (top {} of {})", t.rows.len(), t.total);
    if t.stats.skipped() > 0 {
        title.push_str(&format!(", {} unreadable", t.stats.skipped()));
    }

    let rows = t.rows.iter().map(|p| {
        Row::new(vec![
            Cell::from(p.pid.to_string()).style(Style::default().fg(Color::DarkGray)),
            Cell::from(truncate_middle(&p.name, NAME_MAX)),
            Cell::from(p.status.as_str()),
            Cell::from(format!("{:>5.1}", p.cpu_percent))
                .style(Style::default().fg(cpu_color(p.cpu_percent))),
            Cell::from(format!("{:>8.1}", p.memory_rss_mb))
                .style(Style::default().fg(mem_color(p.memory_rss_mb))),
            Cell::from(format!("{:>8.1}", p.disk_read_mb)),
            Cell::from(p.connection_count.to_string()),
        ])
    });

    let header = Row::new(header_titles(t.sort))
        .style(Style::default().fg(HEADER).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, COLS)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
        .column_spacing(1);
    f.render_stateful_widget(table, area, state);
}
