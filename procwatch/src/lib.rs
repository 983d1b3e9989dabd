//! procwatch front ends: a full-screen TUI and a console printer over `procwatch_engine`.

pub mod app;
pub mod cli;
pub mod config_file;
pub mod console;
pub mod logging;
pub mod presenter;
pub mod ui;
