//! Shared UI theme constants and threshold colors.

use ratatui::style::Color;

pub const LABEL: Color = Color::Magenta;
pub const HEADER: Color = Color::Cyan;
pub const SELECTED_BG: Color = Color::Rgb(60, 60, 80);

pub fn cpu_color(pct: f32) -> Color {
    match pct {
        x if x > 50.0 => Color::Red,
        x if x > 20.0 => Color::Yellow,
        _ => Color::Green,
    }
}

pub fn mem_color(mb: f64) -> Color {
    match mb {
        x if x > 500.0 => Color::Red,
        x if x > 200.0 => Color::Yellow,
        _ => Color::Green,
    }
}
