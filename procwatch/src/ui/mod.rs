//! UI module root: exposes drawing functions for individual panels.

pub mod header;
pub mod info;
pub mod processes;
pub mod theme;
pub mod util;
