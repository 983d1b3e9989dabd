//! Entry point for procwatch. Resolves config, sets up logging, and runs the chosen front end.

use anyhow::Context;
use clap::Parser;
use procwatch::{
    app,
    cli::{Cli, Mode},
    config_file::save_config,
    console::Console,
    logging,
    presenter::drive,
};
use procwatch_engine::Engine;
use std::time::Duration;
use tracing::info;

// Console output only changes when a stream publishes; the tick just bounds shutdown latency.
const CONSOLE_TICK: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }
    if cli.save_config {
        let path = cli.config_path();
        save_config(&path, &cfg)?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    logging::init(&cli)?;
    info!(
        mode = ?cli.mode,
        sort = %cfg.initial_sort(),
        rows = cfg.row_limit,
        "starting procwatch"
    );

    let engine = Engine::start(cfg).context("starting engine")?;
    let res = match cli.mode {
        // Raw mode turns Ctrl-C into a key event; the TUI handles it itself.
        Mode::Tui => app::run(&engine).await,
        Mode::Console => {
            let mut console = Console::new(std::io::stdout(), cli.format, cli.once);
            tokio::select! {
                r = drive(&engine, &mut console, CONSOLE_TICK) => r,
                _ = tokio::signal::ctrl_c() => Ok(()),
            }
        }
    };
    engine.shutdown().await;
    info!("procwatch stopped");
    res
}
