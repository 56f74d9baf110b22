//! Once-per-turn bookkeeping
//!
//! Soft once-per-turn is scoped to (card instance, effect index, controller,
//! turn); hard once-per-turn to (card name, controller, turn), so it spans
//! every copy of the named card. Records from earlier turns are stale and are
//! ignored, then pruned on the next write.

use crate::core::{Card, CardId, OncePerTurn, PlayerId};
use crate::game::GameState;
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptKey {
    Instance { card: CardId, effect_index: usize },
    /// Folded card name (see [`CardName::key`](crate::core::CardName::key))
    Name(String),
}

/// One use of a once-per-turn effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffectRecord {
    pub key: OptKey,
    pub controller: PlayerId,
    pub turn: u32,
}

/// Answer to "may this effect be activated again this turn?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationCheck {
    pub can_activate: bool,
    pub reason: Option<String>,
}

impl ActivationCheck {
    fn allowed() -> Self {
        ActivationCheck {
            can_activate: true,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptTracker {
    records: Vec<ActiveEffectRecord>,
}

impl OptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_for(card: &Card, effect_index: usize, hard: bool) -> OptKey {
        if hard {
            OptKey::Name(card.name.key())
        } else {
            OptKey::Instance {
                card: card.id,
                effect_index,
            }
        }
    }

    pub fn can_activate(
        &self,
        card: &Card,
        effect_index: usize,
        controller: PlayerId,
        hard: bool,
        turn: u32,
    ) -> ActivationCheck {
        let key = Self::key_for(card, effect_index, hard);
        let used = self
            .records
            .iter()
            .any(|r| r.turn == turn && r.controller == controller && r.key == key);
        if used {
            let reason = if hard {
                format!("\"{}\" was already used this turn", card.name)
            } else {
                format!("effect {} of {} was already used this turn", effect_index, card.name)
            };
            ActivationCheck {
                can_activate: false,
                reason: Some(reason),
            }
        } else {
            ActivationCheck::allowed()
        }
    }

    pub fn mark_used(
        &mut self,
        card: &Card,
        effect_index: usize,
        controller: PlayerId,
        hard: bool,
        turn: u32,
    ) {
        self.records.retain(|r| r.turn == turn);
        self.records.push(ActiveEffectRecord {
            key: Self::key_for(card, effect_index, hard),
            controller,
            turn,
        });
    }

    pub fn records(&self) -> &[ActiveEffectRecord] {
        &self.records
    }
}

impl GameState {
    /// Advisory once-per-turn query for an effect of `card`
    pub fn can_activate_effect(
        &self,
        card_id: CardId,
        effect_index: usize,
        controller: PlayerId,
    ) -> Result<ActivationCheck> {
        let card = self.cards.get(card_id)?;
        let effect = card.effect(effect_index).ok_or_else(|| {
            DuelError::InvalidMove(format!("{} has no effect {}", card.name, effect_index))
        })?;
        Ok(match effect.once_per_turn {
            OncePerTurn::Unlimited => ActivationCheck::allowed(),
            OncePerTurn::Soft => {
                self.opt
                    .can_activate(card, effect_index, controller, false, self.turn.turn_number)
            }
            OncePerTurn::Hard => {
                self.opt
                    .can_activate(card, effect_index, controller, true, self.turn.turn_number)
            }
        })
    }

    /// Fail with `OncePerTurnExhausted` when the effect was already used
    pub(crate) fn check_once_per_turn(
        &self,
        card_id: CardId,
        effect_index: usize,
        controller: PlayerId,
    ) -> Result<()> {
        let check = self.can_activate_effect(card_id, effect_index, controller)?;
        if check.can_activate {
            Ok(())
        } else {
            Err(DuelError::OncePerTurnExhausted(
                check.reason.unwrap_or_default(),
            ))
        }
    }

    pub(crate) fn mark_once_per_turn(
        &mut self,
        card_id: CardId,
        effect_index: usize,
        controller: PlayerId,
    ) -> Result<()> {
        let card = self.cards.get(card_id)?;
        let hard = match card.effect(effect_index).map(|e| e.once_per_turn) {
            Some(OncePerTurn::Soft) => false,
            Some(OncePerTurn::Hard) => true,
            _ => return Ok(()),
        };
        let turn = self.turn.turn_number;
        self.opt.mark_used(card, effect_index, controller, hard, turn);
        game_log!(self, Verbose, "opt", "{} effect {} marked used for turn {}", card.name, effect_index, turn);
        Ok(())
    }
}
