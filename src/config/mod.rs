mod settings;
pub mod state;

pub use settings::{Config, EntitySettings, OutputSettings, ReportSettings};
pub use state::{Counter, HistoryEntry, State};

use crate::error::{PtrsError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, falling back to ~/.ptrs/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "ptrs") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        PtrsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".ptrs"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Output directory from config; relative paths are taken from the config directory
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

/// Fail unless `ptrs init` has created the config directory
pub fn ensure_initialized(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        Ok(())
    } else {
        Err(PtrsError::ConfigNotFound(config_dir.to_path_buf()))
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(PtrsError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| PtrsError::ConfigParse { path, source: e })
}

/// Load state.toml (default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| PtrsError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        PtrsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[entity]
name = "Your Entity Pty Ltd"
abn = "12345678901"
# acn_arbn = "123456789"    # optional

[report]
default_type = "Standard PTR"     # or "Nil Reporter", "External Administration"
number_format = "PTR-{year}-{seq:04}"  # e.g., PTR-2026-0001
currency_symbol = "$"

[output]
output_dir = "output"   # relative to this directory, or absolute / ~/
"#;
