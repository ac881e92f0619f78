//! `status.json`: the tracked game, for UIs that poll on their own cadence.
//!
//! The file holds `{"gameName": .., "startTime": ..}` or `null`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::tracker::ActiveGame;

pub fn write_status(path: &Path, game: Option<&ActiveGame>) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(&game)?;
    // Readers must never observe a partially written file.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write status file {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace status file {}", path.display()))?;
    Ok(())
}

/// A missing file reads as "nothing tracked".
pub fn read_status(path: &Path) -> Result<Option<ActiveGame>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read status file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse status file {}", path.display()))
}

pub fn clear_status(path: &Path) {
    let _ = std::fs::remove_file(path);
}
