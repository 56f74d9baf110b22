//! Trigger scanner
//!
//! Every recorded event is scanned exactly once (the event log keeps the
//! watermark). Candidates are the face-up cards on both fields, turn player
//! first, plus the card the event happened to wherever it now is, so "when
//! this card is destroyed" effects still fire from the graveyard. A matching
//! effect goes through the same once-per-turn, prevention and cost gates as a
//! manual activation; only costs that need no choice can be paid here.

use crate::core::{Card, CardId, PlayerId, TriggerCondition, TriggerSubject};
use crate::game::actions::activation_action;
use crate::game::events::TriggerMatch;
use crate::game::{GameEvent, GameState};
use crate::{game_log, DuelError, Result};

impl TriggerCondition {
    /// Does `m` satisfy this condition for a card controlled by `controller`?
    pub(crate) fn accepts(&self, m: &TriggerMatch, card: CardId, controller: PlayerId) -> bool {
        if self.event != m.event {
            return false;
        }
        match self.subject {
            TriggerSubject::ThisCard => m.card == Some(card),
            TriggerSubject::YourSide => m.player == controller,
            TriggerSubject::OpponentSide => m.player != controller,
            TriggerSubject::Any => true,
        }
    }
}

impl GameState {
    /// Face-up field cards, turn player's side first
    fn trigger_candidates(&self) -> Vec<CardId> {
        let active = self.turn.active_player;
        let mut seats: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        seats.sort_by_key(|&p| p != active);

        let mut out = Vec::new();
        for player in seats {
            let Ok(zones) = self.zones(player) else {
                continue;
            };
            out.extend(zones.board.iter().filter(|b| b.is_face_up()).map(|b| b.card));
            out.extend(
                zones
                    .spell_trap
                    .iter()
                    .chain(zones.field.iter())
                    .filter(|s| s.is_face_up())
                    .map(|s| s.card),
            );
        }
        out
    }

    /// Enqueue every effect `event` triggers; returns the number of links added
    pub fn scan(&mut self, event: &GameEvent) -> Result<usize> {
        let defender = self.opponent_of(self.turn.active_player);
        let matches = event.trigger_matches(defender);
        if matches.is_empty() {
            return Ok(0);
        }

        let on_field = self.trigger_candidates();
        let mut candidates: Vec<(CardId, bool)> = on_field.iter().map(|&c| (c, true)).collect();
        for card in matches.iter().filter_map(|m| m.card) {
            if !candidates.iter().any(|(c, _)| *c == card) {
                candidates.push((card, false));
            }
        }

        let mut added = 0;
        for (card_id, face_up_on_field) in candidates {
            let Ok(card) = self.cards.get(card_id) else {
                continue;
            };
            let controller = card.owner;
            let hits: Vec<(usize, Option<CardId>)> = card
                .effects
                .iter()
                .enumerate()
                .filter_map(|(index, effect)| {
                    let condition = effect.trigger_condition()?;
                    if !face_up_on_field && condition.subject != TriggerSubject::ThisCard {
                        return None;
                    }
                    matches
                        .iter()
                        .find(|m| condition.accepts(m, card_id, controller))
                        .map(|m| (index, m.card))
                })
                .collect();

            for (effect_index, event_card) in hits {
                if self.try_trigger(card_id, effect_index, controller, event_card)? {
                    added += 1;
                }
            }
        }

        if self.chain.len() > self.config.max_chain_resolutions {
            return Err(DuelError::ChainOverflow {
                limit: self.config.max_chain_resolutions,
            });
        }
        Ok(added)
    }

    /// Gate and enqueue one triggered effect; `false` when a gate refuses it
    fn try_trigger(
        &mut self,
        card_id: CardId,
        effect_index: usize,
        controller: PlayerId,
        event_card: Option<CardId>,
    ) -> Result<bool> {
        let card: &Card = self.cards.get(card_id)?;
        let Some(effect) = card.effect(effect_index).cloned() else {
            return Ok(false);
        };
        let category = card.category();
        let action = activation_action(card);

        if !self
            .can_activate_effect(card_id, effect_index, controller)?
            .can_activate
        {
            game_log!(self, Verbose, "trigger", "card {} effect {} already used this turn", card_id, effect_index);
            return Ok(false);
        }
        let prevention = self.lingering.is_action_prevented(action, controller);
        if prevention.prevented {
            game_log!(self, Verbose, "trigger", "card {} effect {} prevented: {}", card_id, effect_index, prevention.reason.unwrap_or_default());
            return Ok(false);
        }
        if let Some(cost) = &effect.cost {
            let check = self.can_pay(controller, card_id, cost, None);
            if !check.ok || check.requires_selection {
                game_log!(self, Verbose, "trigger", "card {} effect {} cost not payable", card_id, effect_index);
                return Ok(false);
            }
            self.pay_cost(controller, card_id, cost, None)?;
        }
        self.mark_once_per_turn(card_id, effect_index, controller)?;

        let added = self.add_triggered_link(card_id, effect_index, controller, effect, event_card)?;
        self.record(GameEvent::CardActivated {
            player: controller,
            card: card_id,
            effect_index,
            category,
            chain_index: added.chain_index,
        });
        Ok(true)
    }

    /// Scan everything recorded since the last scan
    ///
    /// Paying a trigger's cost records new events; those are scanned too.
    pub fn scan_new_events(&mut self) -> Result<usize> {
        let mut added = 0;
        while self.events.has_unscanned() {
            for record in self.events.take_unscanned() {
                added += self.scan(&record.event)?;
            }
        }
        if added > 0 {
            game_log!(self, Verbose, "trigger", "{} triggered link(s) enqueued", added);
        }
        Ok(added)
    }
}
