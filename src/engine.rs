//! Engine facade: authenticated, versioned command submission
//!
//! One submission loads the latest snapshot, checks the caller, applies the
//! command to a copy, stores the copy if nobody else stored first, and only
//! then publishes the command's events. A losing racer gets `Conflict` and
//! nothing it did is visible anywhere.

use crate::core::PlayerId;
use crate::game::{apply, Command, CommandOutcome, EventRecord, GameState};
use crate::services::{EventSink, IdentityVerifier, SnapshotStore, VersionedSnapshot};
use crate::{game_log, DuelError, Result};

/// What a successful submission produced
#[derive(Debug, Clone)]
pub struct Submitted {
    /// Version the new snapshot was stored under
    pub version: u64,
    pub outcome: CommandOutcome,
    pub events: Vec<EventRecord>,
}

pub struct DuelEngine<S, I, E> {
    store: S,
    identity: I,
    sink: E,
}

impl<S: SnapshotStore, I: IdentityVerifier, E: EventSink> DuelEngine<S, I, E> {
    pub fn new(store: S, identity: I, sink: E) -> Self {
        DuelEngine {
            store,
            identity,
            sink,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store the opening snapshot of a new game
    pub fn create_game(&self, game_id: &str, state: &GameState) -> Result<u64> {
        self.store.compare_and_store(game_id, 0, state)
    }

    pub fn snapshot(&self, game_id: &str) -> Result<VersionedSnapshot> {
        self.store.load(game_id)
    }

    /// Submit against whatever version is current
    pub fn submit(
        &self,
        game_id: &str,
        caller: &str,
        actor: PlayerId,
        command: Command,
    ) -> Result<Submitted> {
        let snapshot = self.store.load(game_id)?;
        self.run(game_id, caller, actor, command, snapshot)
    }

    /// Submit a command decided while looking at version `seen`
    ///
    /// Fails with `Conflict` if the game moved on since.
    pub fn submit_at(
        &self,
        game_id: &str,
        seen: u64,
        caller: &str,
        actor: PlayerId,
        command: Command,
    ) -> Result<Submitted> {
        let snapshot = self.store.load(game_id)?;
        if snapshot.version != seen {
            return Err(DuelError::Conflict {
                expected: seen,
                found: snapshot.version,
            });
        }
        self.run(game_id, caller, actor, command, snapshot)
    }

    fn run(
        &self,
        game_id: &str,
        caller: &str,
        actor: PlayerId,
        command: Command,
        snapshot: VersionedSnapshot,
    ) -> Result<Submitted> {
        let seat = snapshot.state.player(actor)?.name.clone();
        if !self.identity.verify(caller, seat.as_str()) {
            return Err(DuelError::Unauthorized(format!(
                "caller {caller} may not act for {seat}"
            )));
        }

        let name = command.name();
        let transition = apply(&snapshot.state, actor, command)?;
        let version = self
            .store
            .compare_and_store(game_id, snapshot.version, &transition.state)?;
        game_log!(transition.state, Verbose, "engine", "game {} v{}: {} by {}", game_id, version, name, seat);

        for record in &transition.events {
            let payload = serde_json::to_value(record).unwrap_or_default();
            self.sink.record_event(record.event.kind_name(), payload);
        }

        Ok(Submitted {
            version,
            outcome: transition.outcome,
            events: transition.events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::error::ErrorKind;
    use crate::game::Phase;
    use crate::services::{MemoryEventSink, MemorySnapshotStore, StaticIdentity};
    use std::sync::Arc;

    fn engine() -> (
        DuelEngine<MemorySnapshotStore, StaticIdentity, Arc<MemoryEventSink>>,
        Arc<MemoryEventSink>,
        PlayerId,
    ) {
        let sink = Arc::new(MemoryEventSink::new());
        let identity = StaticIdentity::new()
            .with_seat("alice-token", "Alice")
            .with_seat("bob-token", "Bob");
        let engine = DuelEngine::new(MemorySnapshotStore::new(), identity, Arc::clone(&sink));

        let mut state = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
        state.turn.current_phase = Phase::Main1;
        let p1 = state.players[0].id;
        engine.create_game("g1", &state).unwrap();
        (engine, sink, p1)
    }

    #[test]
    fn test_submit_stores_and_publishes() {
        let (engine, sink, p1) = engine();
        let submitted = engine.submit("g1", "alice-token", p1, Command::SkipToEnd).unwrap();
        assert_eq!(submitted.version, 2);
        assert_eq!(sink.kinds(), vec!["phase_changed"]);
        assert_eq!(
            engine.snapshot("g1").unwrap().state.turn.current_phase,
            Phase::End
        );
    }

    #[test]
    fn test_wrong_caller_is_unauthorized() {
        let (engine, sink, p1) = engine();
        let err = engine.submit("g1", "bob-token", p1, Command::SkipToEnd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(sink.events().is_empty());
        assert_eq!(engine.snapshot("g1").unwrap().version, 1);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let (engine, sink, p1) = engine();
        engine.submit_at("g1", 1, "alice-token", p1, Command::SkipBattle).unwrap();

        let err = engine
            .submit_at("g1", 1, "alice-token", p1, Command::SkipMain2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(sink.kinds().len(), 1);
    }

    #[test]
    fn test_rejected_command_publishes_nothing() {
        let (engine, sink, p1) = engine();
        let err = engine.submit("g1", "alice-token", p1, Command::PassPriority).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMove);
        assert!(sink.events().is_empty());
        assert_eq!(engine.snapshot("g1").unwrap().version, 1);
    }
}
