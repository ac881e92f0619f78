use anyhow::{Context, Result};
use playtime_core::GameCatalog;
use playtime_runtime_config::{CONFIG_FILE_NAME, PlaytimeConfig, apply_fallbacks};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("playtime"))
}

/// Config file path, honoring a `--config` override
pub fn config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Runtime files live next to the config file.
fn runtime_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn pid_file_path(config_path: &Path) -> PathBuf {
    runtime_dir(config_path).join("daemon.pid")
}

pub fn status_file_path(config_path: &Path) -> PathBuf {
    runtime_dir(config_path).join("status.json")
}

pub fn sessions_file_path(config: &PlaytimeConfig, config_path: &Path) -> PathBuf {
    let configured = config.local.sessions_file.trim();
    if configured.is_empty() {
        runtime_dir(config_path).join("sessions.jsonl")
    } else {
        PathBuf::from(configured)
    }
}

/// Load config from disk; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PlaytimeConfig> {
    if !path.exists() {
        return Ok(PlaytimeConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config: PlaytimeConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    if apply_fallbacks(&mut config) {
        warn!("Config at {} had unusable values; defaults applied", path.display());
    }
    Ok(config)
}

pub fn save_config(path: &Path, config: &PlaytimeConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Built-in games plus the `[[games]]` entries. Invalid entries are skipped.
pub fn build_catalog(config: &PlaytimeConfig) -> GameCatalog {
    let mut catalog = GameCatalog::with_defaults();
    for entry in &config.games {
        if let Err(e) = catalog.register(&entry.name, &entry.processes) {
            warn!("Ignoring [[games]] entry: {e}");
        }
    }
    catalog
}
