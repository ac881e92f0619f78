#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Duration;
use playtime_core::ProcessSnapshot;
use playtime_core::testing::t0;
use playtime_daemon::{Clock, ListError, ManualClock, OpenedSession, ProcessLister, SessionSink, SinkError};

/// Lister whose output the test sets between ticks.
#[derive(Clone, Default)]
pub struct ScriptedLister {
    inner: Arc<Mutex<ListerState>>,
}

#[derive(Default)]
struct ListerState {
    names: Vec<String>,
    fail: bool,
    calls: usize,
}

impl ScriptedLister {
    pub fn set(&self, names: &[&str]) {
        let mut state = self.inner.lock().unwrap();
        state.names = names.iter().map(|n| n.to_string()).collect();
        state.fail = false;
    }

    pub fn fail(&self) {
        self.inner.lock().unwrap().fail = true;
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }
}

impl ProcessLister for ScriptedLister {
    async fn list(&self) -> Result<ProcessSnapshot, ListError> {
        let mut state = self.inner.lock().unwrap();
        state.calls += 1;
        if state.fail {
            return Err(ListError::Enumeration("tasklist exited with 1".into()));
        }
        Ok(ProcessSnapshot::from_names(state.names.iter()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open {
        token: String,
        game: String,
        process: String,
    },
    Close {
        token: String,
        session_id: String,
        duration: u64,
    },
}

/// Sink that records every call and can be told to fail.
#[derive(Clone)]
pub struct RecordingSink {
    inner: Arc<Mutex<SinkState>>,
    clock: Arc<ManualClock>,
}

struct SinkState {
    calls: Vec<Call>,
    next_id: u32,
    fail_open: bool,
    fail_close: bool,
    start_skew: Duration,
}

impl RecordingSink {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SinkState {
                calls: Vec::new(),
                next_id: 1,
                fail_open: false,
                fail_close: false,
                start_skew: Duration::zero(),
            })),
            clock,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn opens(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Open { .. }))
            .count()
    }

    pub fn closes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Close { .. }))
            .count()
    }

    pub fn fail_open(&self, fail: bool) {
        self.inner.lock().unwrap().fail_open = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.inner.lock().unwrap().fail_close = fail;
    }

    /// Offset applied to the start time the store reports on open.
    pub fn skew_start(&self, by: Duration) {
        self.inner.lock().unwrap().start_skew = by;
    }
}

impl SessionSink for RecordingSink {
    async fn open(
        &self,
        token: &str,
        game_name: &str,
        process_name: &str,
    ) -> Result<OpenedSession, SinkError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(Call::Open {
            token: token.to_string(),
            game: game_name.to_string(),
            process: process_name.to_string(),
        });
        if state.fail_open {
            return Err(SinkError::Remote("500 Internal Server Error: db down".into()));
        }
        let session_id = format!("s{}", state.next_id);
        state.next_id += 1;
        Ok(OpenedSession {
            session_id,
            start_time: self.clock.now() + state.start_skew,
        })
    }

    async fn close(
        &self,
        token: &str,
        session_id: &str,
        duration_seconds: u64,
    ) -> Result<(), SinkError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(Call::Close {
            token: token.to_string(),
            session_id: session_id.to_string(),
            duration: duration_seconds,
        });
        if state.fail_close {
            return Err(SinkError::Remote("404 Not Found: Session not found".into()));
        }
        Ok(())
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

pub fn open(token: &str, game: &str, process: &str) -> Call {
    Call::Open {
        token: token.into(),
        game: game.into(),
        process: process.into(),
    }
}

pub fn close(token: &str, session_id: &str, duration: u64) -> Call {
    Call::Close {
        token: token.into(),
        session_id: session_id.into(),
        duration,
    }
}
