//! Turn phases and the phase state machine

use crate::core::PlayerId;
use crate::game::GameState;
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Draw,
    Standby,
    Main1,
    BattleStart,
    Battle,
    BattleEnd,
    Main2,
    End,
}

impl Phase {
    /// Successor within the turn; `None` at the end phase
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Draw => Some(Phase::Standby),
            Phase::Standby => Some(Phase::Main1),
            Phase::Main1 => Some(Phase::BattleStart),
            Phase::BattleStart => Some(Phase::Battle),
            Phase::Battle => Some(Phase::BattleEnd),
            Phase::BattleEnd => Some(Phase::Main2),
            Phase::Main2 => Some(Phase::End),
            Phase::End => None,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    pub fn is_battle(&self) -> bool {
        matches!(self, Phase::BattleStart | Phase::Battle | Phase::BattleEnd)
    }

    /// Phases that are passed through immediately on entry
    pub fn is_transitional(&self) -> bool {
        matches!(self, Phase::BattleStart | Phase::BattleEnd)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Draw => "draw",
            Phase::Standby => "standby",
            Phase::Main1 => "main1",
            Phase::BattleStart => "battle_start",
            Phase::Battle => "battle",
            Phase::BattleEnd => "battle_end",
            Phase::Main2 => "main2",
            Phase::End => "end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents the current turn structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnStructure {
    /// Current turn number (starts at 1)
    pub turn_number: u32,

    pub current_phase: Phase,

    /// Active player (whose turn it is)
    pub active_player: PlayerId,

    /// Player allowed to act next (respond or pass)
    pub priority_player: PlayerId,
}

impl TurnStructure {
    pub fn new(starting_player: PlayerId) -> Self {
        TurnStructure {
            turn_number: 1,
            current_phase: Phase::Draw,
            active_player: starting_player,
            priority_player: starting_player,
        }
    }

    /// Start a new turn
    pub fn next_turn(&mut self, next_player: PlayerId) {
        self.turn_number += 1;
        self.current_phase = Phase::Draw;
        self.active_player = next_player;
        self.priority_player = next_player;
    }

    pub fn is_turn_player(&self, player: PlayerId) -> bool {
        self.active_player == player
    }
}

impl GameState {
    /// Shared preconditions of every phase change
    fn check_phase_change(&self, actor: PlayerId) -> Result<()> {
        if !self.turn.is_turn_player(actor) {
            return Err(DuelError::NotYourTurn(format!(
                "player {} cannot change the phase on player {}'s turn",
                actor, self.turn.active_player
            )));
        }
        if !self.chain.is_empty() {
            return Err(DuelError::CannotAdvance(format!(
                "a chain of {} link(s) is still open",
                self.chain.len()
            )));
        }
        if self.pending_selection.is_some() {
            return Err(DuelError::CannotAdvance(
                "a selection is still pending".to_string(),
            ));
        }
        if self.combat.is_active() {
            return Err(DuelError::CannotAdvance(
                "an attack is waiting for damage calculation".to_string(),
            ));
        }
        Ok(())
    }

    /// Move to `to`, expiring lingering effects for every phase passed over
    ///
    /// Records exactly one phase-change event.
    fn transition_to(&mut self, to: Phase) {
        let from = self.turn.current_phase;
        let player = self.turn.active_player;

        let mut closing = from;
        loop {
            self.expire_lingering(closing);
            match closing.next() {
                Some(next) if next != to => closing = next,
                _ => break,
            }
        }

        if !to.is_battle() {
            self.combat.clear();
        }
        self.turn.current_phase = to;
        self.turn.priority_player = player;
        self.events.open_window();
        self.record(crate::game::GameEvent::PhaseChanged { player, from, to });
        game_log!(self, Normal, "phase", "Turn {}: {} -> {}", self.turn.turn_number, from, to);
    }

    /// Advance to the next phase; transitional phases are passed through in the same call
    pub fn advance_phase(&mut self, actor: PlayerId) -> Result<Phase> {
        self.check_phase_change(actor)?;
        let current = self.turn.current_phase;
        let next = current.next().ok_or_else(|| {
            DuelError::CannotAdvance(format!("already at the {current} phase"))
        })?;

        self.transition_to(next);
        if next.is_transitional() {
            if let Some(after) = next.next() {
                self.transition_to(after);
            }
        }
        self.scan_new_events()?;
        Ok(self.turn.current_phase)
    }

    /// Main phase 1 or battle phase straight to main phase 2
    pub fn skip_battle(&mut self, actor: PlayerId) -> Result<Phase> {
        self.skip(actor, &[Phase::Main1, Phase::Battle], Phase::Main2)
    }

    /// Main phase 1 or battle phase straight to the end phase
    pub fn skip_to_end(&mut self, actor: PlayerId) -> Result<Phase> {
        self.skip(actor, &[Phase::Main1, Phase::Battle], Phase::End)
    }

    /// Main phase 2 to the end phase
    pub fn skip_main2(&mut self, actor: PlayerId) -> Result<Phase> {
        self.skip(actor, &[Phase::Main2], Phase::End)
    }

    fn skip(&mut self, actor: PlayerId, allowed_from: &[Phase], to: Phase) -> Result<Phase> {
        self.check_phase_change(actor)?;
        let current = self.turn.current_phase;
        if !allowed_from.contains(&current) {
            return Err(DuelError::CannotAdvance(format!(
                "cannot skip to {to} from the {current} phase"
            )));
        }
        self.transition_to(to);
        self.scan_new_events()?;
        Ok(to)
    }

    /// End the turn: the opponent becomes the turn player and draws
    pub fn pass_turn(&mut self, actor: PlayerId) -> Result<PlayerId> {
        self.check_phase_change(actor)?;
        if self.turn.current_phase != Phase::End {
            return Err(DuelError::CannotAdvance(format!(
                "the turn can only be passed from the end phase, not {}",
                self.turn.current_phase
            )));
        }

        self.expire_lingering(Phase::End);
        let next = self.opponent_of(actor);
        self.turn.next_turn(next);
        for player in self.players.iter_mut() {
            player.reset_turn_flags();
        }
        for (_, zones) in self.player_zones.iter_mut() {
            for slot in zones.board.iter_mut() {
                slot.has_acted = false;
            }
        }

        self.events.open_window();
        let turn = self.turn.turn_number;
        self.record(crate::game::GameEvent::TurnStarted { player: next, turn });
        game_log!(self, Normal, "phase", "Turn {} begins for player {}", turn, next);

        self.draw(next)?;
        self.scan_new_events()?;
        Ok(next)
    }
}
