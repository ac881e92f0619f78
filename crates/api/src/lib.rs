//! Wire types for the session-storage API.
//!
//! Field names follow the server's camelCase JSON. Sessions come back with
//! the store's `_id` key, which is accepted as an alias for `id`.

use chrono::{DateTime, Utc};
use playtime_core::Session;
use playtime_core::stats::GameStats;
use serde::{Deserialize, Serialize};

// ── Sessions ──────────────────────────────────────────────────────────────

/// `POST /api/games/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub game_name: String,
    pub process_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
}

/// `POST /api/games/end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    pub session_id: String,
    /// Whole seconds.
    pub duration: u64,
}

/// A stored session as returned by `/games/end` and `/games/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub game_name: String,
    pub process_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: u64,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Session {
            id: Some(record.id),
            game_name: record.game_name,
            process_name: record.process_name,
            start_time: record.start_time,
            end_time: record.end_time,
            duration_seconds: record.duration,
        }
    }
}

/// One row of `GET /api/games/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsEntry {
    /// Game name; the server groups on it and returns it as `_id`.
    #[serde(rename = "_id")]
    pub game_name: String,
    pub total_time: u64,
    pub session_count: u64,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl From<GameStatsEntry> for GameStats {
    fn from(entry: GameStatsEntry) -> Self {
        GameStats {
            game_name: entry.game_name,
            total_seconds: entry.total_time,
            session_count: entry.session_count,
            last_played: entry.last_played,
        }
    }
}

// ── Auth ──────────────────────────────────────────────────────────────────

/// `POST /api/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Error body returned by the server on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_request_uses_camel_case() {
        let req = StartSessionRequest {
            game_name: "valorant".into(),
            process_name: "valorant.exe".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"gameName": "valorant", "processName": "valorant.exe"})
        );
    }

    #[test]
    fn session_record_accepts_store_id() {
        let record: SessionRecord = serde_json::from_value(json!({
            "_id": "65f0",
            "userId": "u1",
            "gameName": "minecraft",
            "processName": "javaw.exe",
            "startTime": "2026-03-01T20:00:00.000Z",
            "endTime": "2026-03-01T20:10:00.000Z",
            "duration": 600,
            "__v": 0
        }))
        .unwrap();
        let session = Session::from(record);
        assert_eq!(session.id.as_deref(), Some("65f0"));
        assert_eq!(session.duration_seconds, 600);
        assert!(!session.is_open());
    }

    #[test]
    fn stats_entry_maps_grouping_key() {
        let entry: GameStatsEntry = serde_json::from_value(json!({
            "_id": "gta v",
            "totalTime": 4200,
            "sessionCount": 3,
            "lastPlayed": null
        }))
        .unwrap();
        let stats = GameStats::from(entry);
        assert_eq!(stats.game_name, "gta v");
        assert_eq!(stats.total_seconds, 4200);
        assert_eq!(stats.last_played, None);
    }

    #[test]
    fn login_response_accepts_token_aliases() {
        let a: LoginResponse = serde_json::from_value(json!({"token": "t1"})).unwrap();
        let b: LoginResponse = serde_json::from_value(json!({"accessToken": "t2"})).unwrap();
        assert_eq!(a.token, "t1");
        assert_eq!(b.token, "t2");
    }
}
