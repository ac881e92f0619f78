//! Durable recording of session open/close events.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use playtime_api::{EndSessionRequest, StartSessionRequest};
use playtime_api_client::ApiClient;
use playtime_core::Session;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::SinkError;

/// Identity and authoritative start time assigned by the store on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedSession {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
}

pub trait SessionSink: Send + Sync {
    fn open(
        &self,
        token: &str,
        game_name: &str,
        process_name: &str,
    ) -> impl Future<Output = Result<OpenedSession, SinkError>> + Send;

    fn close(
        &self,
        token: &str,
        session_id: &str,
        duration_seconds: u64,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

// ── HTTP ──────────────────────────────────────────────────────────────────

/// Records sessions through the REST API (`/games/start`, `/games/end`).
pub struct HttpSessionSink {
    api: ApiClient,
}

impl HttpSessionSink {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl SessionSink for HttpSessionSink {
    async fn open(
        &self,
        token: &str,
        game_name: &str,
        process_name: &str,
    ) -> Result<OpenedSession, SinkError> {
        let req = StartSessionRequest {
            game_name: game_name.to_string(),
            process_name: process_name.to_string(),
        };
        let resp = self
            .api
            .start_session_with_auth(token, &req)
            .await
            .map_err(SinkError::remote)?;
        Ok(OpenedSession {
            session_id: resp.session_id,
            start_time: resp.start_time,
        })
    }

    async fn close(
        &self,
        token: &str,
        session_id: &str,
        duration_seconds: u64,
    ) -> Result<(), SinkError> {
        let req = EndSessionRequest {
            session_id: session_id.to_string(),
            duration: duration_seconds,
        };
        let record = self
            .api
            .end_session_with_auth(token, &req)
            .await
            .map_err(SinkError::remote)?;
        debug!("Server closed session {} ({}s)", record.id, record.duration);
        Ok(())
    }
}

// ── Local JSONL ───────────────────────────────────────────────────────────

/// One line of the local sessions file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum LocalRecord {
    Open {
        session_id: String,
        game_name: String,
        process_name: String,
        start_time: DateTime<Utc>,
    },
    Close {
        session_id: String,
        end_time: DateTime<Utc>,
        duration: u64,
    },
}

/// Records sessions in an append-only JSONL file on this machine.
pub struct LocalSessionSink {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl LocalSessionSink {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &LocalRecord) -> Result<(), SinkError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl SessionSink for LocalSessionSink {
    async fn open(
        &self,
        _token: &str,
        game_name: &str,
        process_name: &str,
    ) -> Result<OpenedSession, SinkError> {
        let opened = OpenedSession {
            session_id: uuid::Uuid::new_v4().to_string(),
            start_time: self.clock.now(),
        };
        self.append(&LocalRecord::Open {
            session_id: opened.session_id.clone(),
            game_name: game_name.to_string(),
            process_name: process_name.to_string(),
            start_time: opened.start_time,
        })?;
        Ok(opened)
    }

    async fn close(
        &self,
        _token: &str,
        session_id: &str,
        duration_seconds: u64,
    ) -> Result<(), SinkError> {
        let is_open = load_sessions(&self.path)?
            .iter()
            .any(|s| s.is_open() && s.id.as_deref() == Some(session_id));
        if !is_open {
            return Err(SinkError::UnknownSession(session_id.to_string()));
        }
        self.append(&LocalRecord::Close {
            session_id: session_id.to_string(),
            end_time: self.clock.now(),
            duration: duration_seconds,
        })
    }
}

/// Fold a local sessions file into session records, oldest first.
///
/// A missing file is an empty history. Unparseable lines and close records
/// without a matching open are skipped with a warning.
pub fn load_sessions(path: &Path) -> Result<Vec<Session>, SinkError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;

    let mut sessions: Vec<Session> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: LocalRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("{}:{}: skipping bad record: {e}", path.display(), lineno + 1);
                continue;
            }
        };
        match record {
            LocalRecord::Open {
                session_id,
                game_name,
                process_name,
                start_time,
            } => {
                index.insert(session_id.clone(), sessions.len());
                sessions.push(Session::open(
                    Some(session_id),
                    game_name,
                    process_name,
                    start_time,
                ));
            }
            LocalRecord::Close {
                session_id,
                end_time,
                duration,
            } => match index.get(&session_id) {
                Some(&i) => {
                    let session = &mut sessions[i];
                    session.end_time = Some(end_time);
                    session.duration_seconds = duration;
                }
                None => warn!(
                    "{}:{}: close for unknown session {session_id}",
                    path.display(),
                    lineno + 1
                ),
            },
        }
    }

    sessions.sort_by_key(|s| s.start_time);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;
    use playtime_core::testing::t0;

    fn sink(dir: &tempfile::TempDir) -> (LocalSessionSink, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let sink = LocalSessionSink::new(dir.path().join("sessions.jsonl"), clock.clone());
        (sink, clock)
    }

    #[tokio::test]
    async fn open_then_close_folds_into_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, clock) = sink(&dir);

        let opened = sink.open("local", "minecraft", "javaw.exe").await.unwrap();
        assert_eq!(opened.start_time, t0());
        clock.advance(Duration::seconds(90));
        sink.close("local", &opened.session_id, 90).await.unwrap();

        let sessions = load_sessions(sink.path()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].game_name, "minecraft");
        assert_eq!(sessions[0].duration_seconds, 90);
        assert_eq!(sessions[0].end_time, Some(t0() + Duration::seconds(90)));
    }

    #[tokio::test]
    async fn close_of_unknown_or_closed_session_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, _clock) = sink(&dir);

        let err = sink.close("local", "nope", 1).await.unwrap_err();
        assert!(matches!(err, SinkError::UnknownSession(_)));

        let opened = sink.open("local", "roblox", "robloxplayerbeta.exe").await.unwrap();
        sink.close("local", &opened.session_id, 1).await.unwrap();
        let again = sink.close("local", &opened.session_id, 1).await.unwrap_err();
        assert!(matches!(again, SinkError::UnknownSession(_)));
    }

    #[test]
    fn load_skips_garbage_and_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        std::fs::write(
            &path,
            concat!(
                "not json\n",
                "{\"event\":\"close\",\"sessionId\":\"ghost\",\"endTime\":\"2026-03-01T20:00:00Z\",\"duration\":3}\n",
                "\n",
                "{\"event\":\"open\",\"sessionId\":\"a\",\"gameName\":\"gta v\",\"processName\":\"gta5.exe\",\"startTime\":\"2026-03-01T20:00:00Z\"}\n",
            ),
        )
        .unwrap();

        let sessions = load_sessions(&path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].is_open());
        assert_eq!(sessions[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sessions(&dir.path().join("absent.jsonl")).unwrap().is_empty());
    }
}
