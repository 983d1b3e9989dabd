//! Full-screen terminal front end: view state, key handling, drawing, and terminal setup.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use procwatch_engine::{Engine, HostSnapshot, KillOutcome, ProcessTable, SortKey, SortSpec};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    widgets::TableState,
    Terminal,
};

use crate::presenter::{drive, Intent, Presenter};
use crate::ui::{
    header::{draw_header, draw_status},
    info::{draw_info, INFO_HEIGHT},
    processes::draw_processes,
};

const TICK: Duration = Duration::from_millis(50);

#[derive(Default)]
pub struct App {
    host: Option<HostSnapshot>,
    table: Option<ProcessTable>,
    sort: SortSpec,
    state: TableState,
    // Selection follows the pid across refreshes, not the row index.
    selected_pid: Option<u32>,
    status: Option<String>,
    page: usize,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_pid
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn update(
        &mut self,
        host: Option<&HostSnapshot>,
        table: Option<&ProcessTable>,
        sort: SortSpec,
    ) {
        self.sort = sort;
        if let Some(h) = host {
            self.host = Some(h.clone());
        }
        let Some(t) = table else { return };
        let fresh = self
            .table
            .as_ref()
            .map_or(true, |old| old.captured_at != t.captured_at);
        if fresh {
            self.table = Some(t.clone());
            self.reselect();
        }
    }

    fn rows(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.rows.len())
    }

    fn reselect(&mut self) {
        let Some(t) = &self.table else { return };
        if t.rows.is_empty() {
            self.state.select(None);
            self.selected_pid = None;
            return;
        }
        let idx = self
            .selected_pid
            .and_then(|pid| t.rows.iter().position(|r| r.pid == pid))
            .unwrap_or_else(|| self.state.selected().unwrap_or(0).min(t.rows.len() - 1));
        self.select(idx);
    }

    fn select(&mut self, idx: usize) {
        let n = self.rows();
        if n == 0 {
            return;
        }
        let idx = idx.min(n - 1);
        self.state.select(Some(idx));
        self.selected_pid = self.table.as_ref().map(|t| t.rows[idx].pid);
    }

    fn move_by(&mut self, delta: isize) {
        let cur = self.state.selected().unwrap_or(0) as isize;
        self.select((cur + delta).max(0) as usize);
    }

    pub fn handle_key(&mut self, k: KeyEvent) -> Option<Intent> {
        if k.kind != KeyEventKind::Press {
            return None;
        }
        let page = self.page.max(1) as isize;
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Intent::Quit),
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Intent::Quit)
            }
            KeyCode::Char(d @ '1'..='7') => {
                let key = SortKey::ALL[(d as u8 - b'1') as usize];
                self.status = None;
                Some(Intent::Sort(key, key.default_direction()))
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Intent::ReverseSort),
            KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Delete => match self.selected_pid {
                Some(pid) => Some(Intent::Kill(pid)),
                None => {
                    self.status = Some("No process selected".into());
                    Some(Intent::Redraw)
                }
            },
            KeyCode::Up => {
                self.move_by(-1);
                Some(Intent::Redraw)
            }
            KeyCode::Down => {
                self.move_by(1);
                Some(Intent::Redraw)
            }
            KeyCode::PageUp => {
                self.move_by(-page);
                Some(Intent::Redraw)
            }
            KeyCode::PageDown => {
                self.move_by(page);
                Some(Intent::Redraw)
            }
            KeyCode::Home => {
                self.select(0);
                Some(Intent::Redraw)
            }
            KeyCode::End => {
                self.select(usize::MAX);
                Some(Intent::Redraw)
            }
            _ => None,
        }
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),           // header
                Constraint::Length(INFO_HEIGHT), // system info
                Constraint::Min(5),              // processes
                Constraint::Length(1),           // status / keys
            ])
            .split(f.area());

        draw_header(f, rows[0], self.host.as_ref(), self.table.as_ref());
        draw_info(f, rows[1], self.host.as_ref(), self.sort);

        // borders (2) + header row (1)
        self.page = rows[2].height.saturating_sub(3) as usize;
        draw_processes(f, rows[2], self.table.as_ref(), &mut self.state);
        draw_status(f, rows[3], self.status.as_deref());
    }
}

pub struct Tui<B: Backend> {
    terminal: Terminal<B>,
    app: App,
}

impl<B: Backend> Tui<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            app: App::new(),
        }
    }
}

impl<B: Backend> Presenter for Tui<B> {
    fn render(
        &mut self,
        host: Option<&HostSnapshot>,
        table: Option<&ProcessTable>,
        sort: SortSpec,
    ) -> anyhow::Result<()> {
        self.app.update(host, table, sort);
        let app = &mut self.app;
        self.terminal.draw(|f| app.draw(f))?;
        Ok(())
    }

    fn next_intent(&mut self) -> anyhow::Result<Option<Intent>> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(k) => {
                    if let Some(intent) = self.app.handle_key(k) {
                        return Ok(Some(intent));
                    }
                }
                Event::Resize(_, _) => return Ok(Some(Intent::Redraw)),
                _ => {}
            }
        }
        Ok(None)
    }

    fn show_outcome(&mut self, pid: u32, outcome: KillOutcome) -> anyhow::Result<()> {
        self.app.status = Some(outcome.message(pid));
        Ok(())
    }
}

/// Take over the terminal, run until quit, and restore it.
pub async fn run(engine: &Engine) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut tui = Tui::new(Terminal::new(backend)?);
    tui.terminal.clear()?;

    let res = drive(engine, &mut tui, TICK).await;

    disable_raw_mode()?;
    execute!(tui.terminal.backend_mut(), LeaveAlternateScreen)?;
    tui.terminal.show_cursor()?;

    res
}
