//! Top title line and bottom status line.

use procwatch_engine::{HostSnapshot, ProcessTable};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    h: Option<&HostSnapshot>,
    t: Option<&ProcessTable>,
) {
    let updated = t
        .map(|t| t.captured_at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into());
    let title = match h {
        Some(h) => format!(
            "procwatch | user: {} | updated {updated}  (press 'q' to quit)",
            h.username
        ),
        None => "procwatch | sampling...  (press 'q' to quit)".into(),
    };
    f.render_widget(
        Block::default().title(title).borders(Borders::BOTTOM),
        area,
    );
}

pub fn draw_status(f: &mut ratatui::Frame<'_>, area: Rect, status: Option<&str>) {
    let keys = "1-7 sort  r reverse  ↑/↓ select  k kill  q quit";
    let line = match status {
        Some(msg) => Line::from(vec![
            Span::styled(msg.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw("  |  "),
            Span::styled(keys, Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(Span::styled(keys, Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(Paragraph::new(line), area);
}
