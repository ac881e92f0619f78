//! Configuration types for `playtime.toml`.
//!
//! Every field carries a serde default so partial files load. Path
//! resolution and file I/O live in the daemon crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "playtime.toml";

/// Ticks faster than this are clamped.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Top-level configuration (persisted as `playtime.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlaytimeConfig {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub local: LocalSettings,
    /// Extra catalog entries, registered after the built-in games.
    #[serde(default)]
    pub games: Vec<GameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub sink: SinkKind,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            sink: SinkKind::Server,
        }
    }
}

impl TrackerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

/// Where session open/close events are recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// The REST session-storage API.
    #[default]
    #[serde(alias = "api", alias = "http")]
    Server,
    /// An append-only JSONL file on this machine.
    #[serde(alias = "file", alias = "jsonl")]
    Local,
    /// Unknown values are normalized by [`apply_fallbacks`].
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Empty means "not logged in"; tracking is suppressed.
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            auth_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerSettings {
    pub fn auth_token(&self) -> Option<&str> {
        let token = self.auth_token.trim();
        (!token.is_empty()).then_some(token)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalSettings {
    /// Empty means `<config dir>/sessions.jsonl`.
    #[serde(default)]
    pub sessions_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntry {
    pub name: String,
    pub processes: Vec<String>,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_poll_interval_ms() -> u64 {
    2_000
}
fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Normalize values that parsed but are not usable as-is.
/// Returns true when any field was updated.
pub fn apply_fallbacks(config: &mut PlaytimeConfig) -> bool {
    let mut changed = false;

    if config.tracker.sink == SinkKind::Unknown {
        config.tracker.sink = SinkKind::Server;
        changed = true;
    }

    if config.tracker.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        config.tracker.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = PlaytimeConfig::default();
        assert_eq!(cfg.tracker.poll_interval_ms, 2_000);
        assert_eq!(cfg.tracker.poll_interval(), Duration::from_secs(2));
        assert_eq!(cfg.tracker.sink, SinkKind::Server);
        assert_eq!(cfg.server.url, "http://localhost:3000");
        assert_eq!(cfg.server.auth_token(), None);
        assert!(cfg.games.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: PlaytimeConfig = toml::from_str(
            r#"
[server]
auth_token = "  abc  "

[[games]]
name = "hollow knight"
processes = ["hollow_knight.exe"]
"#,
        )
        .expect("parse toml");

        assert_eq!(cfg.server.auth_token(), Some("abc"));
        assert_eq!(cfg.server.timeout_secs, 10);
        assert_eq!(cfg.tracker.poll_interval_ms, 2_000);
        assert_eq!(
            cfg.games,
            vec![GameEntry {
                name: "hollow knight".into(),
                processes: vec!["hollow_knight.exe".into()],
            }]
        );
    }

    #[test]
    fn sink_aliases_and_unknown_values() {
        let local: PlaytimeConfig = toml::from_str("[tracker]\nsink = \"jsonl\"\n").unwrap();
        assert_eq!(local.tracker.sink, SinkKind::Local);

        let mut odd: PlaytimeConfig = toml::from_str("[tracker]\nsink = \"carrier-pigeon\"\n").unwrap();
        assert_eq!(odd.tracker.sink, SinkKind::Unknown);
        assert!(apply_fallbacks(&mut odd));
        assert_eq!(odd.tracker.sink, SinkKind::Server);
    }

    #[test]
    fn fast_poll_interval_is_clamped() {
        let mut cfg: PlaytimeConfig = toml::from_str("[tracker]\npoll_interval_ms = 0\n").unwrap();
        assert_eq!(cfg.tracker.poll_interval(), Duration::from_millis(MIN_POLL_INTERVAL_MS));
        assert!(apply_fallbacks(&mut cfg));
        assert_eq!(cfg.tracker.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert!(!apply_fallbacks(&mut cfg));
    }

    #[test]
    fn config_roundtrip() {
        let mut cfg = PlaytimeConfig::default();
        cfg.server.auth_token = "tok".into();
        cfg.tracker.sink = SinkKind::Local;
        let encoded = toml::to_string_pretty(&cfg).unwrap();
        assert!(encoded.contains("poll_interval_ms = 2000"));
        assert!(encoded.contains("sink = \"local\""));

        let parsed: PlaytimeConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(parsed.server.auth_token(), Some("tok"));
        assert_eq!(parsed.tracker.sink, SinkKind::Local);
    }
}
