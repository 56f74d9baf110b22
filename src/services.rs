//! External collaborators of the engine
//!
//! The rules core never stores, authenticates or publishes anything itself.
//! A host plugs real backends in behind these traits; the in-memory
//! implementations here serve tests, the CLI and single-process hosts.
//!
//! ```rust,ignore
//! let store = MemorySnapshotStore::new();
//! let engine = DuelEngine::new(store, StaticIdentity::allow_all(), NullEventSink);
//! ```

use crate::core::CardDefinition;
use crate::game::GameState;
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// A snapshot together with its optimistic-concurrency version
#[derive(Debug, Clone)]
pub struct VersionedSnapshot {
    pub version: u64,
    pub state: GameState,
}

/// Durable storage of game snapshots
///
/// Implementations must be thread-safe; two hosts may race on one game and
/// exactly one `compare_and_store` may win.
pub trait SnapshotStore: Send + Sync {
    /// Latest snapshot of `game_id`
    fn load(&self, game_id: &str) -> Result<VersionedSnapshot>;

    /// Store `state` as version `expected + 1` if the stored version is still `expected`
    ///
    /// A game that does not exist yet has version 0.
    fn compare_and_store(&self, game_id: &str, expected: u64, state: &GameState) -> Result<u64>;
}

/// Authentication of the caller acting for a seat
pub trait IdentityVerifier: Send + Sync {
    /// Is `caller` allowed to act as `player_name`?
    fn verify(&self, caller: &str, player_name: &str) -> bool;
}

/// Fire-and-forget sink for domain events (analytics, replays, spectators)
pub trait EventSink: Send + Sync {
    fn record_event(&self, kind: &str, payload: Value);
}

/// Lookup of card definitions by catalog id
pub trait CardCatalog {
    fn get_card(&self, id: u32) -> Option<CardDefinition>;

    /// Case-, accent- and punctuation-insensitive name lookup
    fn find_by_name(&self, _name: &str) -> Option<CardDefinition> {
        None
    }
}

fn poisoned<T>(_: PoisonError<T>) -> DuelError {
    DuelError::Io(std::io::Error::other("snapshot store lock poisoned"))
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    games: Mutex<FxHashMap<String, VersionedSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, game_id: &str) -> Result<VersionedSnapshot> {
        let games = self.games.lock().map_err(poisoned)?;
        games
            .get(game_id)
            .cloned()
            .ok_or_else(|| DuelError::GameNotFound(game_id.to_string()))
    }

    fn compare_and_store(&self, game_id: &str, expected: u64, state: &GameState) -> Result<u64> {
        let mut games = self.games.lock().map_err(poisoned)?;
        let found = games.get(game_id).map_or(0, |s| s.version);
        if found != expected {
            return Err(DuelError::Conflict { expected, found });
        }
        let version = expected + 1;
        games.insert(
            game_id.to_string(),
            VersionedSnapshot {
                version,
                state: state.clone(),
            },
        );
        Ok(version)
    }
}

/// Fixed caller-to-seat table
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    seats: FxHashMap<String, String>,
    allow_all: bool,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every caller may act for every seat (local play, tests)
    pub fn allow_all() -> Self {
        StaticIdentity {
            seats: FxHashMap::default(),
            allow_all: true,
        }
    }

    pub fn with_seat(mut self, caller: &str, player_name: &str) -> Self {
        self.seats.insert(caller.to_string(), player_name.to_string());
        self
    }
}

impl IdentityVerifier for StaticIdentity {
    fn verify(&self, caller: &str, player_name: &str) -> bool {
        self.allow_all || self.seats.get(caller).is_some_and(|seat| seat == player_name)
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.events().into_iter().map(|(kind, _)| kind).collect()
    }
}

impl EventSink for MemoryEventSink {
    fn record_event(&self, kind: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((kind.to_string(), payload));
        }
    }
}

/// Drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record_event(&self, _kind: &str, _payload: Value) {}
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn record_event(&self, kind: &str, payload: Value) {
        (**self).record_event(kind, payload)
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<T> {
    fn load(&self, game_id: &str) -> Result<VersionedSnapshot> {
        (**self).load(game_id)
    }

    fn compare_and_store(&self, game_id: &str, expected: u64, state: &GameState) -> Result<u64> {
        (**self).compare_and_store(game_id, expected, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::error::ErrorKind;

    fn state() -> GameState {
        GameState::new_two_player("Alice", "Bob", RulesConfig::default())
    }

    #[test]
    fn test_compare_and_store_versions() {
        let store = MemorySnapshotStore::new();
        assert_eq!(store.load("g1").unwrap_err().kind(), ErrorKind::GameNotFound);

        assert_eq!(store.compare_and_store("g1", 0, &state()).unwrap(), 1);
        assert_eq!(store.compare_and_store("g1", 1, &state()).unwrap(), 2);

        let err = store.compare_and_store("g1", 1, &state()).unwrap_err();
        assert!(matches!(err, DuelError::Conflict { expected: 1, found: 2 }));
        assert_eq!(store.load("g1").unwrap().version, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new().with_seat("token-a", "Alice");
        assert!(identity.verify("token-a", "Alice"));
        assert!(!identity.verify("token-a", "Bob"));
        assert!(!identity.verify("token-b", "Alice"));
        assert!(StaticIdentity::allow_all().verify("anyone", "Bob"));
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemoryEventSink::new();
        sink.record_event("on_summon", serde_json::json!({"card": 3}));
        sink.record_event("phase_changed", Value::Null);
        assert_eq!(sink.kinds(), vec!["on_summon", "phase_changed"]);
        NullEventSink.record_event("ignored", Value::Null);
    }
}
