use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::Session;

/// Play time totals for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub game_name: String,
    pub total_seconds: u64,
    pub session_count: u64,
    /// Latest end time among closed sessions; `None` while all are still open.
    pub last_played: Option<DateTime<Utc>>,
}

impl GameStats {
    fn new(game_name: &str) -> Self {
        Self {
            game_name: game_name.to_string(),
            total_seconds: 0,
            session_count: 0,
            last_played: None,
        }
    }

    fn add(&mut self, session: &Session) {
        self.session_count += 1;
        self.total_seconds += session.duration_seconds;
        if let Some(end) = session.end_time {
            self.last_played = Some(self.last_played.map_or(end, |prev| prev.max(end)));
        }
    }
}

/// Group sessions by game. Results sorted by total time descending, then name.
pub fn aggregate_by_game(sessions: &[Session]) -> Vec<GameStats> {
    let mut map = HashMap::<&str, GameStats>::new();
    for s in sessions {
        map.entry(s.game_name.as_str())
            .or_insert_with(|| GameStats::new(&s.game_name))
            .add(s);
    }
    let mut result: Vec<_> = map.into_values().collect();
    result.sort_by(|a, b| {
        b.total_seconds
            .cmp(&a.total_seconds)
            .then_with(|| a.game_name.cmp(&b.game_name))
    });
    result
}

/// `1h 02m 03s`, `4m 05s`, `9s`.
pub fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

/// Sum of closed durations across every game.
pub fn total_seconds(sessions: &[Session]) -> u64 {
    sessions.iter().map(|s| s.duration_seconds).sum()
}
