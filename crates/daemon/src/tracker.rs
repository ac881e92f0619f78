//! The session state machine.
//!
//! One tick: list processes, detect at most one known game, compare it with
//! the game of the open session, and close/open as needed. The tracker is
//! either idle or tracking exactly one open session. Every failure stays
//! inside the tick; no public method returns an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use playtime_core::{CatalogError, Detection, GameCatalog, ProcessSnapshot, Session, detect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::lister::ProcessLister;
use crate::sink::SessionSink;

/// The game being tracked and when its session started, as published to
/// status readers. Elapsed time is derived by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveGame {
    pub game_name: String,
    pub start_time: DateTime<Utc>,
}

impl ActiveGame {
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        playtime_core::session::whole_seconds_between(self.start_time, now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStatus {
    pub game_name: String,
    pub start_time: DateTime<Utc>,
    pub elapsed_seconds: u64,
}

/// What one tick (or `stop`) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened {
        game_name: String,
        session_id: String,
        start_time: DateTime<Utc>,
    },
    /// The session left memory; `persisted` says whether the store accepted the close.
    Closed { session: Session, persisted: bool },
    /// A game was detected but no auth token is set.
    OpenSuppressed { game_name: String },
    OpenFailed { game_name: String, error: String },
}

struct OpenSession {
    session: Session,
    /// Token the session was opened with; used to close it if the token was
    /// cleared in the meantime.
    token: String,
}

pub struct SessionTracker<L, S> {
    catalog: GameCatalog,
    lister: L,
    sink: S,
    clock: Arc<dyn Clock>,
    auth_token: Option<String>,
    current: Option<OpenSession>,
    last_detected: Option<String>,
}

impl<L: ProcessLister, S: SessionSink> SessionTracker<L, S> {
    pub fn new(catalog: GameCatalog, lister: L, sink: S) -> Self {
        Self::with_clock(catalog, lister, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(catalog: GameCatalog, lister: L, sink: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            lister,
            sink,
            clock,
            auth_token: None,
            current: None,
            last_detected: None,
        }
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn register_game<I, T>(&mut self, name: &str, aliases: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.catalog.register(name, aliases)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_tracking(&self) -> bool {
        self.current.is_some()
    }

    /// Takes effect at the next transition; an open session is left alone.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        match (&self.auth_token, &token) {
            (None, Some(_)) => info!("Auth token set"),
            (Some(_), None) => info!("Auth token cleared"),
            (Some(old), Some(new)) if old != new => info!("Auth token replaced"),
            _ => {}
        }
        self.auth_token = token;
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn active_game(&self) -> Option<ActiveGame> {
        self.current.as_ref().map(|open| ActiveGame {
            game_name: open.session.game_name.clone(),
            start_time: open.session.start_time,
        })
    }

    pub fn current_status(&self) -> Option<CurrentStatus> {
        let open = self.current.as_ref()?;
        Some(CurrentStatus {
            game_name: open.session.game_name.clone(),
            start_time: open.session.start_time,
            elapsed_seconds: open.session.elapsed_seconds(self.clock.now()),
        })
    }

    /// Run one poll-detect-transition cycle.
    pub async fn tick(&mut self) -> Vec<SessionEvent> {
        let snapshot = match self.lister.list().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Process listing failed, treating as no game: {e}");
                ProcessSnapshot::new()
            }
        };
        let detected = detect(&self.catalog, &snapshot);
        self.note_detection(detected.as_ref());

        let tracked = self.current.as_ref().map(|o| o.session.game_name.as_str());
        if tracked == detected.as_ref().map(Detection::game_name) {
            return Vec::new();
        }

        let mut events = Vec::new();
        if let Some(closed) = self.close_current().await {
            events.push(closed);
        }
        if let Some(detection) = detected {
            events.push(self.open(detection).await);
        }
        events
    }

    /// Close the open session, if any. Calling it again is a no-op.
    pub async fn stop(&mut self) -> Option<SessionEvent> {
        self.last_detected = None;
        self.close_current().await
    }

    fn note_detection(&mut self, detected: Option<&Detection>) {
        let name = detected.map(Detection::game_name);
        if self.last_detected.as_deref() == name {
            return;
        }
        match detected {
            Some(d) => info!("Detected {} ({})", d.game_name(), d.process_name),
            None => debug!("No known game running"),
        }
        self.last_detected = name.map(str::to_string);
    }

    async fn open(&mut self, detection: Detection) -> SessionEvent {
        let game_name = detection.game_name().to_string();
        let Some(token) = self.auth_token.clone() else {
            debug!("Not logged in, not opening a session for {game_name}");
            return SessionEvent::OpenSuppressed { game_name };
        };

        match self
            .sink
            .open(&token, &game_name, &detection.process_name)
            .await
        {
            Ok(opened) => {
                info!("Session started: {game_name} ({})", opened.session_id);
                let session = Session::open(
                    Some(opened.session_id.clone()),
                    game_name.clone(),
                    detection.process_name,
                    opened.start_time,
                );
                self.current = Some(OpenSession { session, token });
                SessionEvent::Opened {
                    game_name,
                    session_id: opened.session_id,
                    start_time: opened.start_time,
                }
            }
            Err(e) => {
                warn!("Could not start session for {game_name}: {e}");
                SessionEvent::OpenFailed {
                    game_name,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn close_current(&mut self) -> Option<SessionEvent> {
        let OpenSession { mut session, token } = self.current.take()?;
        let duration = session.close(self.clock.now());
        let session_id = session.id.clone().unwrap_or_default();
        let token = self.auth_token.clone().unwrap_or(token);

        let persisted = match self.sink.close(&token, &session_id, duration).await {
            Ok(()) => {
                info!("Session ended: {} ({duration}s)", session.game_name);
                true
            }
            Err(e) => {
                warn!(
                    "Could not end session {session_id} for {} ({duration}s), dropping it: {e}",
                    session.game_name
                );
                false
            }
        };
        Some(SessionEvent::Closed { session, persisted })
    }
}
