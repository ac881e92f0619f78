use chrono::{DateTime, TimeZone, Utc};

use crate::catalog::GameCatalog;
use crate::snapshot::ProcessSnapshot;

/// Fixed reference instant for tests (2026-03-01T20:00:00Z).
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Snapshot built from raw process names.
pub fn snapshot(names: &[&str]) -> ProcessSnapshot {
    ProcessSnapshot::from_names(names.iter().copied())
}

/// Catalog holding only the given `(name, aliases)` entries.
pub fn catalog(entries: &[(&str, &[&str])]) -> GameCatalog {
    let mut catalog = GameCatalog::new();
    for (name, aliases) in entries {
        if let Err(e) = catalog.register(name, aliases.iter().copied()) {
            panic!("invalid test catalog entry {name}: {e}");
        }
    }
    catalog
}
