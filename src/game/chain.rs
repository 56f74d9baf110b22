//! The chain: pending effects resolved last-declared-first
//!
//! A link enters the chain only after its cost is paid. Links resolve as a
//! work list: the top link is popped, executed, and the trigger scanner runs
//! before the next pop, so a trigger produced by link N resolves before link
//! N-1. A link whose resolution needs a player choice suspends the whole
//! resolution as a [`PendingSelection`]; [`GameState::submit_selection`]
//! resumes it.

use crate::core::{
    ActivationClass, Card, CardId, CardKind, ParsedEffect, PlayerId, SpellKind, Targets, TrapKind,
};
use crate::game::{ExecutionOutcome, GameEvent, GameState};
use crate::zones::Zone;
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};

/// Spell speed: a link may only be answered by an equal or faster one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpellSpeed {
    One = 1,
    Two = 2,
    Three = 3,
}

/// Speed of `effect` when activated from `card`
pub fn spell_speed(card: &Card, effect: &ParsedEffect) -> SpellSpeed {
    if effect.is_negation() {
        return SpellSpeed::Three;
    }
    match card.kind {
        CardKind::Spell(SpellKind::QuickPlay) => SpellSpeed::Two,
        CardKind::Spell(_) => SpellSpeed::One,
        CardKind::Trap(TrapKind::Counter) => SpellSpeed::Three,
        CardKind::Trap(_) => SpellSpeed::Two,
        CardKind::Monster => {
            if effect.activation == ActivationClass::Quick {
                SpellSpeed::Two
            } else {
                SpellSpeed::One
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainLink {
    /// 1-based position in the chain
    pub index: usize,
    pub source: CardId,
    pub effect_index: usize,
    pub controller: PlayerId,
    pub speed: SpellSpeed,
    pub effect: ParsedEffect,
    pub targets: Targets,
    pub negated: bool,
    /// Put on the chain by the trigger scanner
    pub triggered: bool,
    /// The card the triggering event happened to
    pub event_card: Option<CardId>,
}

/// Result of a successful `add_link`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAdded {
    pub chain_index: usize,
    pub chain_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Empty,
    Open,
    Resolving,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chain {
    links: Vec<ChainLink>,
    /// Consecutive priority passes since the last link was added
    passes: u8,
    resolving: bool,
    /// Links popped during the current resolution, triggered links included
    resolved: usize,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ChainState {
        if self.resolving {
            ChainState::Resolving
        } else if self.links.is_empty() {
            ChainState::Empty
        } else {
            ChainState::Open
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn top(&self) -> Option<&ChainLink> {
        self.links.last()
    }

    /// Link by 1-based chain index
    pub fn get(&self, index: usize) -> Option<&ChainLink> {
        self.links.iter().find(|l| l.index == index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChainLink> {
        self.links.iter_mut().find(|l| l.index == index)
    }

    /// Add a manually activated link; rejected if slower than the top link
    ///
    /// `event_card` is the card of the event the activation answers, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn add_link(
        &mut self,
        source: CardId,
        effect_index: usize,
        controller: PlayerId,
        speed: SpellSpeed,
        effect: ParsedEffect,
        targets: Targets,
        event_card: Option<CardId>,
    ) -> Result<LinkAdded> {
        if let Some(top) = self.top() {
            if speed < top.speed {
                return Err(DuelError::InvalidMove(format!(
                    "spell speed {} cannot respond to chain link {} (spell speed {})",
                    speed as u8, top.index, top.speed as u8
                )));
            }
        }
        Ok(self.push(source, effect_index, controller, speed, effect, targets, false, event_card))
    }

    /// Add a link produced by the trigger scanner; triggers ignore speed ordering
    pub fn add_triggered_link(
        &mut self,
        source: CardId,
        effect_index: usize,
        controller: PlayerId,
        speed: SpellSpeed,
        effect: ParsedEffect,
        event_card: Option<CardId>,
    ) -> LinkAdded {
        self.push(
            source,
            effect_index,
            controller,
            speed,
            effect,
            Targets::new(),
            true,
            event_card,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        source: CardId,
        effect_index: usize,
        controller: PlayerId,
        speed: SpellSpeed,
        effect: ParsedEffect,
        targets: Targets,
        triggered: bool,
        event_card: Option<CardId>,
    ) -> LinkAdded {
        let index = self.links.len() + 1;
        self.links.push(ChainLink {
            index,
            source,
            effect_index,
            controller,
            speed,
            effect,
            targets,
            negated: false,
            triggered,
            event_card,
        });
        self.passes = 0;
        LinkAdded {
            chain_index: index,
            chain_length: self.links.len(),
        }
    }

    fn pop(&mut self) -> Option<ChainLink> {
        self.links.pop()
    }
}

/// What the player must choose to let a suspended link finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub available: Vec<CardId>,
    pub min: usize,
    pub max: usize,
    pub prompt: String,
}

impl SelectionRequest {
    /// Fail with `InvalidTarget` unless `choices` answers this request
    pub fn validate(&self, choices: &[CardId]) -> Result<()> {
        if choices.len() < self.min || choices.len() > self.max {
            return Err(DuelError::InvalidTarget(format!(
                "expected between {} and {} card(s), got {}",
                self.min,
                self.max,
                choices.len()
            )));
        }
        for (i, choice) in choices.iter().enumerate() {
            if !self.available.contains(choice) {
                return Err(DuelError::InvalidTarget(format!("card {choice} is not a valid choice")));
            }
            if choices[..i].contains(choice) {
                return Err(DuelError::InvalidTarget(format!("card {choice} chosen twice")));
            }
        }
        Ok(())
    }
}

/// A chain link whose resolution waits for its controller's choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSelection {
    pub chooser: PlayerId,
    pub link: ChainLink,
    pub request: SelectionRequest,
}

/// Where a resolution attempt stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// The chain is empty again
    Resolved { links: usize },
    /// A link waits for `chooser` to answer `request`
    Suspended {
        chooser: PlayerId,
        request: SelectionRequest,
    },
}

/// Result of a priority pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    PriorityPassed { to: PlayerId },
    Chain(ChainOutcome),
}

impl GameState {
    /// Put a manually activated effect on the chain and hand priority to the opponent
    #[allow(clippy::too_many_arguments)]
    pub fn add_link(
        &mut self,
        source: CardId,
        effect_index: usize,
        controller: PlayerId,
        speed: SpellSpeed,
        effect: ParsedEffect,
        targets: Targets,
        event_card: Option<CardId>,
    ) -> Result<LinkAdded> {
        let added = self
            .chain
            .add_link(source, effect_index, controller, speed, effect, targets, event_card)?;
        self.turn.priority_player = self.opponent_of(controller);
        game_log!(
            self,
            Normal,
            "chain",
            "Chain link {} added: card {} effect {} (spell speed {})",
            added.chain_index,
            source,
            effect_index,
            speed as u8
        );
        Ok(added)
    }

    pub(crate) fn add_triggered_link(
        &mut self,
        source: CardId,
        effect_index: usize,
        controller: PlayerId,
        effect: ParsedEffect,
        event_card: Option<CardId>,
    ) -> Result<LinkAdded> {
        let speed = spell_speed(self.cards.get(source)?, &effect);
        let added = self
            .chain
            .add_triggered_link(source, effect_index, controller, speed, effect, event_card);
        if !self.chain.resolving {
            self.turn.priority_player = self.opponent_of(controller);
        }
        game_log!(
            self,
            Normal,
            "chain",
            "Chain link {} triggered: card {} effect {}",
            added.chain_index,
            source,
            effect_index
        );
        Ok(added)
    }

    /// The priority holder declines to respond; two passes in a row resolve the chain
    pub fn pass_priority(&mut self, actor: PlayerId) -> Result<PassOutcome> {
        if self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(
                "a selection must be submitted first".to_string(),
            ));
        }
        if self.chain.is_empty() {
            return Err(DuelError::InvalidMove("there is no chain to respond to".to_string()));
        }
        if self.turn.priority_player != actor {
            return Err(DuelError::InvalidMove(format!(
                "player {actor} does not hold priority"
            )));
        }

        self.chain.passes += 1;
        if self.chain.passes >= 2 {
            return Ok(PassOutcome::Chain(self.resolve_chain()?));
        }
        let to = self.opponent_of(actor);
        self.turn.priority_player = to;
        game_log!(self, Verbose, "chain", "player {} passes priority", actor);
        Ok(PassOutcome::PriorityPassed { to })
    }

    /// Resolve every link, newest first, including links triggered along the way
    pub fn resolve_chain(&mut self) -> Result<ChainOutcome> {
        if self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(
                "the chain is waiting for a selection".to_string(),
            ));
        }
        if self.chain.is_empty() {
            return Ok(ChainOutcome::Resolved { links: 0 });
        }
        self.chain.resolving = true;
        self.chain.resolved = 0;
        self.drain_chain(None)
    }

    /// Answer a pending selection and continue resolving
    pub fn submit_selection(&mut self, actor: PlayerId, choices: &[CardId]) -> Result<ChainOutcome> {
        let pending = self.pending_selection.as_ref().ok_or_else(|| {
            DuelError::InvalidMove("no selection is pending".to_string())
        })?;
        if pending.chooser != actor {
            return Err(DuelError::InvalidMove(format!(
                "the pending selection belongs to player {}",
                pending.chooser
            )));
        }
        pending.request.validate(choices)?;

        let Some(pending) = self.pending_selection.take() else {
            return Err(DuelError::InvalidMove("no selection is pending".to_string()));
        };
        self.drain_chain(Some((pending.link, choices.to_vec())))
    }

    fn drain_chain(&mut self, mut resumed: Option<(ChainLink, Vec<CardId>)>) -> Result<ChainOutcome> {
        loop {
            let (link, selection) = match resumed.take() {
                Some((link, choices)) => (link, Some(choices)),
                None => {
                    let Some(link) = self.chain.pop() else {
                        break;
                    };
                    self.chain.resolved += 1;
                    if self.chain.resolved > self.config.max_chain_resolutions {
                        return Err(DuelError::ChainOverflow {
                            limit: self.config.max_chain_resolutions,
                        });
                    }
                    (link, None)
                }
            };

            if link.negated {
                self.record(GameEvent::ChainLinkNegated {
                    chain_index: link.index,
                    card: link.source,
                });
                game_log!(self, Normal, "chain", "Chain link {} was negated", link.index);
                self.finish_link(&link)?;
                self.scan_new_events()?;
                continue;
            }

            match self.execute(&link, selection.as_deref())? {
                ExecutionOutcome::Applied { message } => {
                    game_log!(self, Normal, "chain", "Chain link {} resolves: {}", link.index, message);
                    self.record(GameEvent::EffectResolved {
                        player: link.controller,
                        card: link.source,
                        effect_index: link.effect_index,
                        message,
                    });
                }
                ExecutionOutcome::Fizzled { message } => {
                    game_log!(self, Normal, "chain", "Chain link {} fizzles: {}", link.index, message);
                    self.record(GameEvent::EffectFizzled {
                        player: link.controller,
                        card: link.source,
                        effect_index: link.effect_index,
                        message,
                    });
                }
                ExecutionOutcome::RequiresSelection(request) => {
                    let chooser = link.controller;
                    game_log!(self, Normal, "chain", "Chain link {} waits: {}", link.index, request.prompt);
                    self.turn.priority_player = chooser;
                    self.pending_selection = Some(PendingSelection {
                        chooser,
                        link,
                        request: request.clone(),
                    });
                    return Ok(ChainOutcome::Suspended { chooser, request });
                }
            }

            self.finish_link(&link)?;
            self.scan_new_events()?;
        }

        let links = self.chain.resolved;
        self.chain.resolving = false;
        self.chain.resolved = 0;
        self.chain.passes = 0;
        self.turn.priority_player = self.turn.active_player;
        self.record(GameEvent::ChainResolved { links });
        game_log!(self, Normal, "chain", "Chain resolved ({} link(s))", links);
        Ok(ChainOutcome::Resolved { links })
    }

    /// One-shot spells and traps leave the field once their link is done
    fn finish_link(&mut self, link: &ChainLink) -> Result<()> {
        if link.triggered {
            return Ok(());
        }
        let card = self.cards.get(link.source)?;
        if card.is_monster() || card.stays_on_field() {
            return Ok(());
        }
        if self.zone_of(link.source) == Some(Zone::SpellTrap) {
            self.move_card(link.source, Zone::Graveyard)?;
        }
        Ok(())
    }
}
