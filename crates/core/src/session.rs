use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One continuous interval of play for one game.
///
/// `id` is assigned by whatever store persisted the open; it is `None` only
/// for records that never reached a store. `duration_seconds` stays zero
/// until the session is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub game_name: String,
    pub process_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: u64,
}

impl Session {
    pub fn open(
        id: Option<String>,
        game_name: impl Into<String>,
        process_name: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            game_name: game_name.into(),
            process_name: process_name.into(),
            start_time,
            end_time: None,
            duration_seconds: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whole seconds between start and `now`, floored; zero if `now` precedes start.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        whole_seconds_between(self.start_time, now)
    }

    /// Stamp the end time and derive the duration. Closing twice keeps the
    /// first end time.
    pub fn close(&mut self, now: DateTime<Utc>) -> u64 {
        if self.end_time.is_none() {
            self.end_time = Some(now);
            self.duration_seconds = self.elapsed_seconds(now);
        }
        self.duration_seconds
    }
}

pub fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis / 1000) as u64
}
