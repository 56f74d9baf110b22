//! Player actions: activations, summons and sets
//!
//! Every action validates completely before it mutates anything. An
//! activation runs its gates in a fixed order (spell speed, timing, prevention,
//! once-per-turn, targets, cost) and only then places the card, pays the
//! cost, marks the once-per-turn use and adds the chain link.

use crate::core::{
    ActionKind, ActivationClass, Card, CardId, CardKind, ParsedEffect, PlayerId, Protection,
    SpellKind, TargetRef, TargetSelector, Targets,
};
use crate::game::cost_payment::{CostCheck, CostPayment};
use crate::game::{spell_speed, GameEvent, GameState, LinkAdded, TriggerMatch};
use crate::zones::{BoardCard, Face, SpellTrapSlot, Stance, Zone};
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};

/// The prohibition that blocks activating an effect of `card`
pub(crate) fn activation_action(card: &Card) -> ActionKind {
    match card.kind {
        CardKind::Monster => ActionKind::ActivateMonsterEffect,
        CardKind::Spell(_) => ActionKind::ActivateSpell,
        CardKind::Trap(_) => ActionKind::ActivateTrap,
    }
}

/// Player input accompanying an activation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    /// Declared targets, for effects that target on activation
    pub targets: Targets,
    /// Cards chosen for a cost that needs a selection
    pub payment: Option<CostPayment>,
}

impl ActivationRequest {
    pub fn with_targets(targets: impl IntoIterator<Item = TargetRef>) -> Self {
        ActivationRequest {
            targets: targets.into_iter().collect(),
            payment: None,
        }
    }

    pub fn with_payment(mut self, cards: Vec<CardId>) -> Self {
        self.payment = Some(CostPayment::new(cards));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The effect is on the chain
    Chained(LinkAdded),
    /// A field spell took the field slot without using the chain
    FieldSpellPlaced { replaced: Option<CardId> },
    /// The cost needs a card selection; nothing was changed
    CostSelection(CostCheck),
}

/// Where the activated card is, and what activating it does to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Spell played from the hand into a spell/trap slot
    FromHand,
    /// Set spell or trap turned face-up
    FlipSet,
    /// Effect of a card that stays where it is
    InPlace,
}

impl GameState {
    /// Own turn, main phase, nothing waiting
    fn require_main_phase_action(&self, actor: PlayerId, what: &str) -> Result<()> {
        if self.is_game_over() {
            return Err(DuelError::InvalidMove("the duel is over".to_string()));
        }
        if !self.turn.is_turn_player(actor) {
            return Err(DuelError::NotYourTurn(format!(
                "player {actor} cannot {what} on player {}'s turn",
                self.turn.active_player
            )));
        }
        if !self.turn.current_phase.is_main() {
            return Err(DuelError::InvalidPhase(format!(
                "cannot {what} during the {} phase",
                self.turn.current_phase
            )));
        }
        if !self.chain.is_empty() || self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(format!(
                "cannot {what} while a chain is open"
            )));
        }
        Ok(())
    }

    /// Does the response window hold an event `effect`'s trigger condition accepts?
    fn window_satisfies(&self, card: CardId, controller: PlayerId, effect: &ParsedEffect) -> bool {
        effect.trigger_condition().is_none() || self.window_match(card, controller, effect).is_some()
    }

    /// Latest event in the response window meeting the effect's trigger condition
    fn window_match(&self, card: CardId, controller: PlayerId, effect: &ParsedEffect) -> Option<TriggerMatch> {
        let condition = effect.trigger_condition()?;
        let defender = self.opponent_of(self.turn.active_player);
        self.events.window().iter().rev().find_map(|record| {
            record
                .event
                .trigger_matches(defender)
                .into_iter()
                .find(|m| condition.accepts(m, card, controller))
        })
    }

    /// Timing gates for activating `effect` of `card` from `zone`
    fn check_activation_timing(
        &self,
        actor: PlayerId,
        card: &Card,
        zone: Zone,
        effect: &ParsedEffect,
    ) -> Result<Placement> {
        let own_turn = self.turn.is_turn_player(actor);
        let chain_open = !self.chain.is_empty();

        if chain_open && self.turn.priority_player != actor {
            return Err(DuelError::InvalidMove(format!(
                "player {actor} does not hold priority"
            )));
        }

        let face_down_slot = self.spell_trap_slot(card.id).filter(|s| !s.is_face_up());
        let placement = match (card.kind, zone) {
            (CardKind::Spell(SpellKind::QuickPlay), Zone::Hand) => {
                if !own_turn {
                    return Err(DuelError::NotYourTurn(
                        "quick-play spells can only be played from the hand on your own turn"
                            .to_string(),
                    ));
                }
                Placement::FromHand
            }
            (CardKind::Spell(_), Zone::Hand) => {
                self.require_main_phase_action(actor, "activate this spell")?;
                Placement::FromHand
            }
            (CardKind::Spell(SpellKind::QuickPlay), Zone::SpellTrap) if face_down_slot.is_some() => {
                Placement::FlipSet
            }
            (CardKind::Spell(_), Zone::SpellTrap) if face_down_slot.is_some() => {
                self.require_main_phase_action(actor, "activate this spell")?;
                Placement::FlipSet
            }
            (CardKind::Trap(_), Zone::SpellTrap) => match face_down_slot {
                Some(slot) => {
                    if slot.turn_set >= self.turn.turn_number {
                        return Err(DuelError::InvalidMove(
                            "a trap cannot be activated the turn it was set".to_string(),
                        ));
                    }
                    if !self.window_satisfies(card.id, actor, effect) {
                        return Err(DuelError::InvalidMove(
                            "the trap's activation condition has not been met".to_string(),
                        ));
                    }
                    Placement::FlipSet
                }
                None => {
                    self.check_effect_class(actor, effect)?;
                    Placement::InPlace
                }
            },
            (CardKind::Trap(_), _) => {
                return Err(DuelError::InvalidMove(
                    "traps must be set before they can be activated".to_string(),
                ))
            }
            (CardKind::Spell(_), Zone::SpellTrap | Zone::FieldSlot) => {
                self.check_effect_class(actor, effect)?;
                Placement::InPlace
            }
            (CardKind::Monster, Zone::Board) => {
                if !self.board_card(card.id).is_some_and(BoardCard::is_face_up) {
                    return Err(DuelError::InvalidMove(
                        "face-down monsters cannot activate effects".to_string(),
                    ));
                }
                self.check_effect_class(actor, effect)?;
                Placement::InPlace
            }
            (CardKind::Monster, Zone::Hand | Zone::Graveyard) if self.usable_off_field(effect, zone) => {
                self.check_effect_class(actor, effect)?;
                Placement::InPlace
            }
            (_, zone) => {
                return Err(DuelError::CardNotInExpectedZone {
                    card: card.id.as_u32(),
                    reason: format!("its effects cannot be activated from the {zone:?}"),
                })
            }
        };
        Ok(placement)
    }

    /// Monster effects usable from the hand or graveyard use up the card itself
    fn usable_off_field(&self, effect: &ParsedEffect, zone: Zone) -> bool {
        use crate::core::{Cost, EffectKind};
        let self_cost = effect.cost.as_ref().is_some_and(|cost| {
            cost.components().iter().any(|c| match zone {
                Zone::Hand => matches!(c, Cost::DiscardSelf),
                Zone::Graveyard => matches!(c, Cost::BanishSelf),
                _ => false,
            })
        });
        let summons_itself = effect.kind == EffectKind::SpecialSummon
            && effect
                .target
                .as_ref()
                .is_some_and(|t| t.selector == TargetSelector::ThisCard);
        self_cost || summons_itself
    }

    /// Timing by activation class, for effects of cards already in place
    fn check_effect_class(&self, actor: PlayerId, effect: &ParsedEffect) -> Result<()> {
        match effect.activation {
            ActivationClass::Ignition => self.require_main_phase_action(actor, "activate this effect"),
            ActivationClass::Quick => Ok(()),
            ActivationClass::Continuous => Err(DuelError::InvalidMove(
                "continuous effects apply on their own and are never activated".to_string(),
            )),
            ActivationClass::TriggerOnly => Err(DuelError::InvalidMove(
                "this effect activates automatically when its condition is met".to_string(),
            )),
        }
    }

    /// Validate declared targets against the effect's target spec
    fn check_declared_targets(
        &self,
        actor: PlayerId,
        source: CardId,
        effect: &ParsedEffect,
        requested: &Targets,
    ) -> Result<Targets> {
        let Some(spec) = effect.target.as_ref().filter(|t| t.declared) else {
            return Ok(Targets::new());
        };

        if spec.selector == TargetSelector::ChainLink {
            let top = self.chain.top().ok_or_else(|| {
                DuelError::InvalidTarget("there is no activation to respond to".to_string())
            })?;
            return Ok(Targets::from_elem(TargetRef::ChainLink(top.index), 1));
        }

        let candidates = self.target_candidates(actor, spec, Some(source));
        if candidates.is_empty() {
            return Err(DuelError::InvalidTarget("there are no valid targets".to_string()));
        }
        let min = spec.min_choices().max(1);
        let max = spec.count as usize;
        if requested.len() < min || requested.len() > max {
            return Err(DuelError::InvalidTarget(format!(
                "declare between {min} and {max} target(s), got {}",
                requested.len()
            )));
        }
        for (i, target) in requested.iter().enumerate() {
            let TargetRef::Card(card) = *target else {
                return Err(DuelError::InvalidTarget(format!("{target:?} is not a card")));
            };
            if !candidates.contains(&card) {
                return Err(DuelError::InvalidTarget(format!(
                    "card {card} does not match the effect's target"
                )));
            }
            if requested[..i].contains(target) {
                return Err(DuelError::InvalidTarget(format!("card {card} targeted twice")));
            }
            let owner = self.cards.get(card)?.owner;
            if owner != actor && self.has_protection(card, Protection::Targeting)? {
                return Err(DuelError::InvalidTarget(format!(
                    "card {card} cannot be targeted by your card effects"
                )));
            }
        }
        Ok(requested.clone())
    }

    /// Activate effect `effect_index` of `card_id`
    ///
    /// Returns `CostSelection` without touching the state when the cost needs
    /// cards chosen; re-submit with [`ActivationRequest::payment`] filled in.
    pub fn activate(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        effect_index: usize,
        request: ActivationRequest,
    ) -> Result<ActivationOutcome> {
        if self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(
                "a selection must be submitted first".to_string(),
            ));
        }
        if self.is_game_over() {
            return Err(DuelError::InvalidMove("the duel is over".to_string()));
        }
        let card = self.cards.get(card_id)?.clone();
        if card.owner != actor {
            return Err(DuelError::InvalidMove(format!(
                "player {actor} does not control {}",
                card.name
            )));
        }
        let zone = self.zone_of(card_id).ok_or_else(|| DuelError::CardNotInExpectedZone {
            card: card_id.as_u32(),
            reason: "card is not in any zone".to_string(),
        })?;

        if card.is_field_spell() && zone == Zone::Hand {
            return self.activate_field_spell(actor, &card);
        }

        let effect = card.effect(effect_index).cloned().ok_or_else(|| {
            DuelError::InvalidMove(format!("{} has no effect {}", card.name, effect_index))
        })?;

        let speed = spell_speed(&card, &effect);
        if let Some(top) = self.chain.top() {
            if speed < top.speed {
                return Err(DuelError::InvalidMove(format!(
                    "spell speed {} cannot respond to chain link {} (spell speed {})",
                    speed as u8, top.index, top.speed as u8
                )));
            }
        }

        let placement = self.check_activation_timing(actor, &card, zone, &effect)?;
        if placement == Placement::FromHand
            && self.zones(actor)?.spell_trap.len() >= self.config.max_spell_trap_slots
        {
            return Err(DuelError::InvalidMove("no free spell/trap slot".to_string()));
        }

        let prevention = self
            .lingering
            .is_action_prevented(activation_action(&card), actor);
        if prevention.prevented {
            return Err(DuelError::InvalidMove(prevention.reason.unwrap_or_default()));
        }

        self.check_once_per_turn(card_id, effect_index, actor)?;
        let targets = self.check_declared_targets(actor, card_id, &effect, &request.targets)?;

        if let Some(cost) = &effect.cost {
            let check = self.can_pay(actor, card_id, cost, request.payment.as_ref());
            if !check.ok {
                return Err(DuelError::CannotPayCost(check.reason.unwrap_or_default()));
            }
            if check.requires_selection {
                return Ok(ActivationOutcome::CostSelection(check));
            }
        }

        // "that monster" refers to the card of the event being answered
        let event_card = self
            .window_match(card_id, actor, &effect)
            .and_then(|m| m.card);

        // Validation done; mutate
        let turn = self.turn.turn_number;
        match placement {
            Placement::FromHand => {
                let zones = self.zones_mut(actor)?;
                zones.hand.remove(card_id);
                zones.spell_trap.push(SpellTrapSlot::face_up(card_id, turn));
            }
            Placement::FlipSet => {
                if let Some(slot) = self.zones_mut(actor)?.spell_trap_slot_mut(card_id) {
                    slot.face = Face::Up;
                    slot.activated = true;
                }
            }
            Placement::InPlace => {}
        }
        if let Some(cost) = &effect.cost {
            self.pay_cost(actor, card_id, cost, request.payment.as_ref())?;
        }
        self.mark_once_per_turn(card_id, effect_index, actor)?;

        let added = self.add_link(card_id, effect_index, actor, speed, effect, targets, event_card)?;
        self.events.open_window();
        self.record(GameEvent::CardActivated {
            player: actor,
            card: card_id,
            effect_index,
            category: card.category(),
            chain_index: added.chain_index,
        });
        game_log!(self, Normal, "activate", "player {} activates {} (effect {})", actor, card.name, effect_index);
        self.scan_new_events()?;
        Ok(ActivationOutcome::Chained(added))
    }

    /// Field spells skip the chain: the old one goes to the graveyard, the new one is placed
    fn activate_field_spell(&mut self, actor: PlayerId, card: &Card) -> Result<ActivationOutcome> {
        self.require_main_phase_action(actor, "activate a field spell")?;
        let prevention = self
            .lingering
            .is_action_prevented(ActionKind::ActivateSpell, actor);
        if prevention.prevented {
            return Err(DuelError::InvalidMove(prevention.reason.unwrap_or_default()));
        }

        let replaced = self.zones(actor)?.field.as_ref().map(|s| s.card);
        if let Some(old) = replaced {
            self.move_card(old, Zone::Graveyard)?;
        }
        let turn = self.turn.turn_number;
        let zones = self.zones_mut(actor)?;
        zones.hand.remove(card.id);
        zones.field = Some(SpellTrapSlot::face_up(card.id, turn));

        self.events.open_window();
        self.record(GameEvent::FieldSpellPlaced {
            player: actor,
            card: card.id,
            replaced,
        });
        game_log!(self, Normal, "activate", "player {} places field spell {}", actor, card.name);
        self.scan_new_events()?;
        Ok(ActivationOutcome::FieldSpellPlaced { replaced })
    }

    /// Shared validation of normal summon and monster set
    fn check_monster_placement(
        &self,
        actor: PlayerId,
        card_id: CardId,
        tributes: &[CardId],
        what: &str,
    ) -> Result<()> {
        self.require_main_phase_action(actor, what)?;
        if !self.player(actor)?.can_normal_summon() {
            return Err(DuelError::InvalidMove(
                "you already normal summoned or set a monster this turn".to_string(),
            ));
        }
        let prevention = self
            .lingering
            .is_action_prevented(ActionKind::NormalSummon, actor);
        if prevention.prevented {
            return Err(DuelError::InvalidMove(prevention.reason.unwrap_or_default()));
        }

        let card = self.cards.get(card_id)?;
        if card.owner != actor {
            return Err(DuelError::InvalidMove(format!("{} is not your card", card.name)));
        }
        self.expect_zone(card_id, Zone::Hand)?;
        if !card.is_monster() {
            return Err(DuelError::InvalidMove(format!("{} is not a monster", card.name)));
        }

        let required = card.tributes_required();
        if tributes.len() != required {
            return Err(DuelError::InvalidMove(format!(
                "level {} monster requires tribute of {} monster(s), {} given",
                card.level,
                required,
                tributes.len()
            )));
        }
        let zones = self.zones(actor)?;
        for (i, tribute) in tributes.iter().enumerate() {
            if zones.board_card(*tribute).is_none() {
                return Err(DuelError::CardNotInExpectedZone {
                    card: tribute.as_u32(),
                    reason: "tributes must be monsters you control".to_string(),
                });
            }
            if tributes[..i].contains(tribute) {
                return Err(DuelError::InvalidMove(format!("card {tribute} tributed twice")));
            }
        }
        if zones.board.len() - tributes.len() >= self.config.max_board_slots {
            return Err(DuelError::InvalidMove("no free monster slot".to_string()));
        }
        Ok(())
    }

    fn place_monster(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        tributes: &[CardId],
        stance: Stance,
        face: Face,
    ) -> Result<()> {
        for &tribute in tributes {
            self.move_card(tribute, Zone::Graveyard)?;
        }
        let turn = self.turn.turn_number;
        let zones = self.zones_mut(actor)?;
        zones.hand.remove(card_id);
        zones.board.push(BoardCard::new(card_id, stance, face, turn));
        self.player_mut(actor)?.normal_summon_used = true;
        Ok(())
    }

    /// Normal summon `card_id` from the hand, tributing `tributes`
    pub fn normal_summon(&mut self, actor: PlayerId, card_id: CardId, tributes: &[CardId]) -> Result<()> {
        self.check_monster_placement(actor, card_id, tributes, "normal summon")?;
        self.place_monster(actor, card_id, tributes, Stance::Offense, Face::Up)?;
        self.events.open_window();
        self.record(GameEvent::NormalSummoned {
            player: actor,
            card: card_id,
        });
        game_log!(self, Normal, "summon", "player {} normal summons card {}", actor, card_id);
        self.scan_new_events()?;
        Ok(())
    }

    /// Set `card_id` face-down in defense stance
    pub fn set_monster(&mut self, actor: PlayerId, card_id: CardId, tributes: &[CardId]) -> Result<()> {
        self.check_monster_placement(actor, card_id, tributes, "set a monster")?;
        self.place_monster(actor, card_id, tributes, Stance::Defense, Face::Down)?;
        self.events.open_window();
        self.record(GameEvent::MonsterSet {
            player: actor,
            card: card_id,
        });
        game_log!(self, Normal, "summon", "player {} sets a monster", actor);
        self.scan_new_events()?;
        Ok(())
    }

    /// Turn a face-down monster face-up in offense stance
    pub fn flip_summon(&mut self, actor: PlayerId, card_id: CardId) -> Result<()> {
        self.require_main_phase_action(actor, "flip summon")?;
        let turn = self.turn.turn_number;
        let slot = self
            .zones(actor)?
            .board_card(card_id)
            .ok_or_else(|| DuelError::CardNotInExpectedZone {
                card: card_id.as_u32(),
                reason: "only monsters you control can be flip summoned".to_string(),
            })?;
        if slot.is_face_up() {
            return Err(DuelError::InvalidMove(format!("card {card_id} is already face-up")));
        }
        if slot.summoned_turn >= turn {
            return Err(DuelError::InvalidMove(
                "a monster cannot be flip summoned the turn it was set".to_string(),
            ));
        }

        if let Some(slot) = self.zones_mut(actor)?.board_card_mut(card_id) {
            slot.face = Face::Up;
            slot.stance = Stance::Offense;
        }
        self.events.open_window();
        self.record(GameEvent::FlipSummoned {
            player: actor,
            card: card_id,
        });
        game_log!(self, Normal, "summon", "player {} flip summons card {}", actor, card_id);
        self.scan_new_events()?;
        Ok(())
    }

    /// Set a spell or trap face-down in a spell/trap slot
    pub fn set_spell_trap(&mut self, actor: PlayerId, card_id: CardId) -> Result<()> {
        self.require_main_phase_action(actor, "set a card")?;
        let card = self.cards.get(card_id)?;
        if card.owner != actor {
            return Err(DuelError::InvalidMove(format!("{} is not your card", card.name)));
        }
        if card.is_monster() {
            return Err(DuelError::InvalidMove(
                "monsters are set with set_monster".to_string(),
            ));
        }
        if card.is_field_spell() {
            return Err(DuelError::InvalidMove(
                "field spells are activated, not set".to_string(),
            ));
        }
        self.expect_zone(card_id, Zone::Hand)?;
        if self.zones(actor)?.spell_trap.len() >= self.config.max_spell_trap_slots {
            return Err(DuelError::InvalidMove("no free spell/trap slot".to_string()));
        }

        let turn = self.turn.turn_number;
        let zones = self.zones_mut(actor)?;
        zones.hand.remove(card_id);
        zones.spell_trap.push(SpellTrapSlot::set(card_id, turn));
        self.events.open_window();
        self.record(GameEvent::CardSet {
            player: actor,
            card: card_id,
        });
        game_log!(self, Normal, "set", "player {} sets a card", actor);
        Ok(())
    }
}
