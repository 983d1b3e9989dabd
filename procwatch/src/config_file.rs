//! On-disk configuration: a JSON `EngineConfig`.
//! Stored under the XDG config dir: $XDG_CONFIG_HOME/procwatch/config.json
//! (fallback ~/.config/procwatch/config.json).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use procwatch_engine::EngineConfig;

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("procwatch")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("procwatch")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load `path`. A missing file yields the defaults; an unreadable or malformed one is an error.
pub fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s)
            .with_context(|| format!("malformed config file {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EngineConfig::default()),
        Err(e) => {
            Err(e).with_context(|| format!("reading config file {}", path.display()))
        }
    }
}

pub fn save_config(path: &Path, cfg: &EngineConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config dir {}", parent.display()))?;
    }
    let data = serde_json::to_vec_pretty(cfg)?;
    fs::write(path, data)
        .with_context(|| format!("writing config file {}", path.display()))
}
