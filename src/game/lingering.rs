//! Lingering-effect registry
//!
//! Temporary stat modifiers, protection grants and action prohibitions whose
//! lifetime is tied to a phase or to the turn. Only the phase machine clears
//! entries (on every phase exit); everything else reads through
//! [`LingeringRegistry::is_action_prevented`], [`LingeringRegistry::stat_bonus`]
//! and [`LingeringRegistry::has_protection`].

use crate::core::{ActionKind, CardId, ExpiryScope, PlayerId, Protection, Stat};
use crate::game::{GameEvent, GameState, Phase};
use crate::game_log;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LingeringPayload {
    StatModifier {
        card: CardId,
        stat: Stat,
        amount: i32,
    },
    Protection {
        card: CardId,
        protection: Protection,
    },
    /// `affected` may not perform `action`
    Prevention {
        action: ActionKind,
        affected: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LingeringEffectRecord {
    pub id: u32,
    pub source: CardId,
    pub controller: PlayerId,
    pub payload: LingeringPayload,
    pub scope: ExpiryScope,
    pub registered_turn: u32,
}

impl LingeringEffectRecord {
    /// Does closing `phase` on `turn` end this record?
    fn expires_on(&self, phase: Phase, turn: u32) -> bool {
        if self.registered_turn < turn {
            return true;
        }
        match self.scope {
            ExpiryScope::Phase(p) => p == phase,
            ExpiryScope::Turn => phase == Phase::End,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreventionCheck {
    pub prevented: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LingeringRegistry {
    records: Vec<LingeringEffectRecord>,
    next_id: u32,
}

impl LingeringRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        source: CardId,
        controller: PlayerId,
        payload: LingeringPayload,
        scope: ExpiryScope,
        turn: u32,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(LingeringEffectRecord {
            id,
            source,
            controller,
            payload,
            scope,
            registered_turn: turn,
        });
        id
    }

    /// Remove every record whose scope closes with `closing`; returns the removed records
    pub fn expire(&mut self, closing: Phase, turn: u32) -> Vec<LingeringEffectRecord> {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.expires_on(closing, turn));
        self.records = kept;
        expired
    }

    /// Drop card-bound modifiers when the card leaves the field
    pub fn remove_for_card(&mut self, card: CardId) {
        self.records.retain(|r| match &r.payload {
            LingeringPayload::StatModifier { card: c, .. }
            | LingeringPayload::Protection { card: c, .. } => *c != card,
            LingeringPayload::Prevention { .. } => true,
        });
    }

    pub fn is_action_prevented(&self, action: ActionKind, actor: PlayerId) -> PreventionCheck {
        let blocking = self.records.iter().find(|r| {
            matches!(
                r.payload,
                LingeringPayload::Prevention { action: a, affected } if a == action && affected == actor
            )
        });
        match blocking {
            Some(record) => PreventionCheck {
                prevented: true,
                reason: Some(format!(
                    "cannot {} (lingering effect {} from card {})",
                    action.describe(),
                    record.id,
                    record.source
                )),
            },
            None => PreventionCheck {
                prevented: false,
                reason: None,
            },
        }
    }

    pub fn stat_bonus(&self, card: CardId, stat: Stat) -> i32 {
        self.records
            .iter()
            .map(|r| match r.payload {
                LingeringPayload::StatModifier {
                    card: c,
                    stat: s,
                    amount,
                } if c == card && s == stat => amount,
                _ => 0,
            })
            .sum()
    }

    pub fn has_protection(&self, card: CardId, protection: Protection) -> bool {
        self.records.iter().any(|r| {
            matches!(
                r.payload,
                LingeringPayload::Protection { card: c, protection: p } if c == card && p == protection
            )
        })
    }

    pub fn records(&self) -> &[LingeringEffectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl GameState {
    /// Register a lingering effect for the current turn and record it
    pub fn register_lingering(
        &mut self,
        source: CardId,
        controller: PlayerId,
        payload: LingeringPayload,
        scope: ExpiryScope,
    ) -> u32 {
        let turn = self.turn.turn_number;
        let id = self.lingering.register(source, controller, payload, scope, turn);
        self.record(GameEvent::LingeringRegistered { id, source });
        game_log!(self, Verbose, "lingering", "lingering effect {} from card {} ({:?})", id, source, scope);
        id
    }

    /// Clear everything whose lifetime ends with `closing`
    pub(crate) fn expire_lingering(&mut self, closing: Phase) {
        let turn = self.turn.turn_number;
        for record in self.lingering.expire(closing, turn) {
            self.record(GameEvent::LingeringExpired {
                id: record.id,
                source: record.source,
            });
            game_log!(self, Verbose, "lingering", "lingering effect {} expired leaving {}", record.id, closing);
        }
    }
}
