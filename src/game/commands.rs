//! Command dispatch over immutable snapshots
//!
//! A [`Command`] is one player decision. [`apply`] never touches its input:
//! it clones the snapshot, runs the command against the clone and hands back
//! the new snapshot together with the events the command produced. On error
//! the clone is dropped, so a rejected command leaves no trace.

use crate::core::{CardId, PlayerId};
use crate::game::actions::{ActivationOutcome, ActivationRequest};
use crate::game::combat::BattleOutcome;
use crate::game::{ChainOutcome, EventRecord, GameState, PassOutcome, Phase};
use crate::Result;
use serde::{Deserialize, Serialize};

/// A player decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AdvancePhase,
    SkipBattle,
    SkipToEnd,
    SkipMain2,
    PassTurn,
    NormalSummon {
        card: CardId,
        #[serde(default)]
        tributes: Vec<CardId>,
    },
    SetMonster {
        card: CardId,
        #[serde(default)]
        tributes: Vec<CardId>,
    },
    FlipSummon {
        card: CardId,
    },
    SetSpellTrap {
        card: CardId,
    },
    Activate {
        card: CardId,
        #[serde(default)]
        effect_index: usize,
        #[serde(default)]
        request: ActivationRequest,
    },
    PassPriority,
    SubmitSelection {
        choices: Vec<CardId>,
    },
    DeclareAttack {
        attacker: CardId,
        target: Option<CardId>,
    },
    ResolveBattle,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AdvancePhase => "advance_phase",
            Command::SkipBattle => "skip_battle",
            Command::SkipToEnd => "skip_to_end",
            Command::SkipMain2 => "skip_main2",
            Command::PassTurn => "pass_turn",
            Command::NormalSummon { .. } => "normal_summon",
            Command::SetMonster { .. } => "set_monster",
            Command::FlipSummon { .. } => "flip_summon",
            Command::SetSpellTrap { .. } => "set_spell_trap",
            Command::Activate { .. } => "activate",
            Command::PassPriority => "pass_priority",
            Command::SubmitSelection { .. } => "submit_selection",
            Command::DeclareAttack { .. } => "declare_attack",
            Command::ResolveBattle => "resolve_battle",
        }
    }
}

/// What a command did, beyond the events it recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    PhaseEntered(Phase),
    TurnPassed { to: PlayerId },
    Done,
    Activation(ActivationOutcome),
    Priority(PassOutcome),
    Chain(ChainOutcome),
    Battle(BattleOutcome),
}

/// The result of a successful command
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<EventRecord>,
    pub outcome: CommandOutcome,
}

impl GameState {
    /// Run `command` in place
    pub fn dispatch(&mut self, actor: PlayerId, command: Command) -> Result<CommandOutcome> {
        let outcome = match command {
            Command::AdvancePhase => CommandOutcome::PhaseEntered(self.advance_phase(actor)?),
            Command::SkipBattle => CommandOutcome::PhaseEntered(self.skip_battle(actor)?),
            Command::SkipToEnd => CommandOutcome::PhaseEntered(self.skip_to_end(actor)?),
            Command::SkipMain2 => CommandOutcome::PhaseEntered(self.skip_main2(actor)?),
            Command::PassTurn => CommandOutcome::TurnPassed {
                to: self.pass_turn(actor)?,
            },
            Command::NormalSummon { card, tributes } => {
                self.normal_summon(actor, card, &tributes)?;
                CommandOutcome::Done
            }
            Command::SetMonster { card, tributes } => {
                self.set_monster(actor, card, &tributes)?;
                CommandOutcome::Done
            }
            Command::FlipSummon { card } => {
                self.flip_summon(actor, card)?;
                CommandOutcome::Done
            }
            Command::SetSpellTrap { card } => {
                self.set_spell_trap(actor, card)?;
                CommandOutcome::Done
            }
            Command::Activate {
                card,
                effect_index,
                request,
            } => CommandOutcome::Activation(self.activate(actor, card, effect_index, request)?),
            Command::PassPriority => CommandOutcome::Priority(self.pass_priority(actor)?),
            Command::SubmitSelection { choices } => {
                CommandOutcome::Chain(self.submit_selection(actor, &choices)?)
            }
            Command::DeclareAttack { attacker, target } => {
                self.declare_attack(actor, attacker, target)?;
                CommandOutcome::Done
            }
            Command::ResolveBattle => CommandOutcome::Battle(self.resolve_battle(actor)?),
        };
        Ok(outcome)
    }
}

/// Apply `command` to a copy of `state`
pub fn apply(state: &GameState, actor: PlayerId, command: Command) -> Result<Transition> {
    let mut next = state.clone();
    let outcome = next.dispatch(actor, command)?;
    let events = next.events.drain();
    Ok(Transition {
        state: next,
        events,
        outcome,
    })
}
