//! The contract every front end implements, and the loop that drives one.

use std::time::Duration;

use procwatch_engine::{
    Engine, HostSnapshot, KillOutcome, ProcessTable, SortDirection, SortKey, SortSpec,
};
use tracing::debug;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Sort(SortKey, SortDirection),
    ReverseSort,
    Kill(u32),
    /// Local view state changed (selection, resize).
    Redraw,
    Quit,
}

pub trait Presenter {
    fn render(
        &mut self,
        host: Option<&HostSnapshot>,
        table: Option<&ProcessTable>,
        sort: SortSpec,
    ) -> anyhow::Result<()>;

    /// Next pending intent, if any. Must not block.
    fn next_intent(&mut self) -> anyhow::Result<Option<Intent>>;

    fn show_outcome(&mut self, pid: u32, outcome: KillOutcome) -> anyhow::Result<()>;
}

/// Render whenever either stream publishes and forward intents to `engine`
/// until the presenter asks to quit. `tick` bounds input latency.
pub async fn drive<P: Presenter>(
    engine: &Engine,
    presenter: &mut P,
    tick: Duration,
) -> anyhow::Result<()> {
    let mut host_rx = engine.host_updates();
    let mut table_rx = engine.table_updates();
    let mut dirty = true;

    loop {
        if dirty {
            let host = host_rx.borrow_and_update().clone();
            let table = table_rx.borrow_and_update().clone();
            presenter.render(host.as_ref(), table.as_deref(), engine.sort_spec())?;
            dirty = false;
        }

        match presenter.next_intent()? {
            Some(Intent::Quit) => {
                debug!("quit requested");
                return Ok(());
            }
            Some(Intent::Sort(key, direction)) => {
                engine.on_sort_key_changed(key, direction);
                dirty = true;
            }
            Some(Intent::ReverseSort) => {
                engine.toggle_sort_direction();
                dirty = true;
            }
            Some(Intent::Kill(pid)) => {
                let outcome = engine.on_kill_requested(pid).await;
                presenter.show_outcome(pid, outcome)?;
                dirty = true;
            }
            Some(Intent::Redraw) => dirty = true,
            None => {
                tokio::select! {
                    r = host_rx.changed() => {
                        r?;
                        dirty = true;
                    }
                    r = table_rx.changed() => {
                        r?;
                        dirty = true;
                    }
                    _ = tokio::time::sleep(tick) => {}
                }
            }
        }
    }
}
