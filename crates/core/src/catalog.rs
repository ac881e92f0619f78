//! Known games and the process names that identify them.
//!
//! Matching is deliberately lenient: an observed process matches an alias
//! when it equals the alias, equals the alias without `.exe`, or merely
//! *contains* the alias stem. That lets one entry cover launcher and shipping
//! executables (`leagueclientux.exe` matches `leagueclient.exe`), at the cost
//! of false positives whenever an alias stem happens to be a substring of an
//! unrelated process name. When several entries match, the one registered
//! first wins.

use serde::{Deserialize, Serialize};

use crate::snapshot::{ProcessSnapshot, strip_exe};

/// Catalog seeded by [`GameCatalog::with_defaults`], in registration order.
pub const DEFAULT_GAMES: &[(&str, &[&str])] = &[
    ("valorant", &["VALORANT-Win64-Shipping.exe", "VALORANT.exe"]),
    ("stardew valley", &["Stardew Valley.exe", "StardewValley.exe"]),
    (
        "league of legends",
        &["LeagueClient.exe", "League of Legends.exe", "LeagueClientUx.exe"],
    ),
    ("counter-strike 2", &["cs2.exe"]),
    (
        "minecraft",
        &["Minecraft.exe", "javaw.exe", "MinecraftLauncher.exe"],
    ),
    ("roblox", &["RobloxPlayerBeta.exe", "RobloxPlayerLauncher.exe"]),
    ("gta v", &["GTA5.exe", "PlayGTAV.exe"]),
    ("euro truck simulator 2", &["eurotrucks2.exe"]),
    (
        "fortnite",
        &["FortniteClient-Win64-Shipping.exe", "FortniteLauncher.exe"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("game name must not be empty")]
    EmptyName,
    #[error("game '{0}' needs at least one process alias")]
    NoAliases(String),
    #[error("alias '{alias}' for game '{game}' is empty once '.exe' is removed")]
    BlankAlias { game: String, alias: String },
}

/// A canonical game name plus the ordered process aliases that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdentity {
    name: String,
    aliases: Vec<String>,
}

impl GameIdentity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// First alias (in alias order) matching any process in the snapshot.
    pub fn matching_alias(&self, snapshot: &ProcessSnapshot) -> Option<&str> {
        self.aliases
            .iter()
            .find(|alias| snapshot.iter().any(|process| alias_matches(process, alias)))
            .map(String::as_str)
    }
}

/// Match rule between one observed process name and one catalog alias.
///
/// Both sides are compared lowercased. Containment is one-directional: the
/// process must contain the alias stem, never the other way round.
pub fn alias_matches(process: &str, alias: &str) -> bool {
    let process = process.to_lowercase();
    let alias = alias.to_lowercase();
    let stem = strip_exe(&alias);
    process == alias || process == stem || process.contains(stem)
}

/// Insertion-ordered mapping from canonical game name to its aliases.
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: Vec<GameIdentity>,
}

impl GameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for (name, aliases) in DEFAULT_GAMES {
            catalog
                .register(name, aliases.iter().copied())
                .expect("default catalog entries are valid");
        }
        catalog
    }

    /// Insert a game, or replace the aliases of an existing one in place.
    ///
    /// Names and aliases are trimmed and lowercased. A replaced entry keeps
    /// its original position, so resolution priority does not change.
    pub fn register<I, S>(&mut self, name: &str, aliases: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let mut normalized = Vec::new();
        for alias in aliases {
            let alias = alias.as_ref().trim().to_lowercase();
            if strip_exe(&alias).is_empty() {
                return Err(CatalogError::BlankAlias { game: name, alias });
            }
            if !normalized.contains(&alias) {
                normalized.push(alias);
            }
        }
        if normalized.is_empty() {
            return Err(CatalogError::NoAliases(name));
        }

        match self.games.iter_mut().find(|game| game.name == name) {
            Some(existing) => existing.aliases = normalized,
            None => self.games.push(GameIdentity {
                name,
                aliases: normalized,
            }),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GameIdentity> {
        let name = name.trim().to_lowercase();
        self.games.iter().find(|game| game.name == name)
    }

    /// First registered game with any alias matching the snapshot.
    pub fn resolve(&self, snapshot: &ProcessSnapshot) -> Option<&GameIdentity> {
        self.games
            .iter()
            .find(|game| game.matching_alias(snapshot).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameIdentity> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(names: &[&str]) -> ProcessSnapshot {
        ProcessSnapshot::from_names(names.iter().copied())
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let catalog = GameCatalog::with_defaults();
        let game = catalog
            .resolve(&snapshot(&["VALORANT-WIN64-SHIPPING.EXE"]))
            .expect("valorant");
        assert_eq!(game.name(), "valorant");
    }

    #[test]
    fn snapshot_containing_alias_stem_matches() {
        let mut catalog = GameCatalog::new();
        catalog.register("league of legends", ["LeagueClient.exe"]).unwrap();
        let game = catalog
            .resolve(&snapshot(&["leagueclientux.exe"]))
            .expect("substring match");
        assert_eq!(game.name(), "league of legends");
    }

    #[test]
    fn alias_containing_process_does_not_match() {
        let mut catalog = GameCatalog::new();
        catalog.register("league of legends", ["LeagueClientUx.exe"]).unwrap();
        assert!(catalog.resolve(&snapshot(&["leagueclient.exe"])).is_none());
    }

    #[test]
    fn first_registered_game_wins_ties() {
        let mut catalog = GameCatalog::new();
        catalog.register("launcher", ["game"]).unwrap();
        catalog.register("the game", ["game.exe"]).unwrap();
        let game = catalog.resolve(&snapshot(&["game.exe"])).unwrap();
        assert_eq!(game.name(), "launcher");
    }

    #[test]
    fn resolve_is_deterministic() {
        let catalog = GameCatalog::with_defaults();
        let snap = snapshot(&["javaw.exe", "cs2.exe", "explorer.exe"]);
        let first = catalog.resolve(&snap).map(|g| g.name().to_string());
        for _ in 0..10 {
            assert_eq!(catalog.resolve(&snap).map(|g| g.name().to_string()), first);
        }
        assert_eq!(first.as_deref(), Some("counter-strike 2"));
    }

    #[test]
    fn register_replaces_in_place() {
        let mut catalog = GameCatalog::new();
        catalog.register("a", ["a.exe"]).unwrap();
        catalog.register("b", ["b.exe"]).unwrap();
        catalog.register("A", ["Alpha.exe", "alpha.exe"]).unwrap();

        let names: Vec<_> = catalog.iter().map(GameIdentity::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(catalog.get("a").unwrap().aliases(), ["alpha.exe"]);
    }

    #[test]
    fn register_rejects_invalid_entries() {
        let mut catalog = GameCatalog::new();
        assert_eq!(
            catalog.register("  ", ["x.exe"]),
            Err(CatalogError::EmptyName)
        );
        assert_eq!(
            catalog.register("x", Vec::<String>::new()),
            Err(CatalogError::NoAliases("x".into()))
        );
        assert!(matches!(
            catalog.register("x", [".EXE"]),
            Err(CatalogError::BlankAlias { .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn no_match_on_unrelated_processes() {
        let catalog = GameCatalog::with_defaults();
        assert!(
            catalog
                .resolve(&snapshot(&["explorer.exe", "chrome.exe"]))
                .is_none()
        );
        assert!(catalog.resolve(&ProcessSnapshot::new()).is_none());
    }

    #[test]
    fn defaults_keep_registration_order() {
        let catalog = GameCatalog::with_defaults();
        assert_eq!(catalog.len(), DEFAULT_GAMES.len());
        assert_eq!(catalog.iter().next().unwrap().name(), "valorant");
        assert_eq!(catalog.iter().last().unwrap().name(), "fortnite");
    }
}
