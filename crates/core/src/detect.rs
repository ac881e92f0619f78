use crate::catalog::{GameCatalog, GameIdentity};
use crate::snapshot::ProcessSnapshot;

/// A known game found running in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub game: GameIdentity,
    /// The catalog alias that matched, reported to the session store.
    pub process_name: String,
}

impl Detection {
    pub fn game_name(&self) -> &str {
        self.game.name()
    }
}

/// Resolve at most one running game. Stateless: the same catalog and
/// snapshot always yield the same answer.
pub fn detect(catalog: &GameCatalog, snapshot: &ProcessSnapshot) -> Option<Detection> {
    let game = catalog.resolve(snapshot)?;
    let process_name = game.matching_alias(snapshot)?.to_string();
    Some(Detection {
        game: game.clone(),
        process_name,
    })
}
