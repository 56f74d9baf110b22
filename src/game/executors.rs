//! Effect executors
//!
//! One executor per [`EffectKind`], dispatched by a closed `match`. Executors
//! re-check their preconditions at resolution time: a target that left its
//! zone, a full board or an empty deck turns the link into a fizzle instead
//! of an error. Executors that need a choice return
//! [`ExecutionOutcome::RequiresSelection`] before touching the state and are
//! called again with the player's answer.

use crate::core::{
    ActionKind, CardId, EffectKind, ExpiryScope, PlayerId, Protection, Stat, TargetRef,
    TargetSelector, TargetSpec, Who,
};
use crate::game::{ChainLink, GameEvent, GameState, LingeringPayload, SelectionRequest};
use crate::zones::{BoardCard, Face, Stance, Zone};
use crate::{game_log, Result};
use rand::seq::SliceRandom;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Applied { message: String },
    Fizzled { message: String },
    RequiresSelection(SelectionRequest),
}

impl ExecutionOutcome {
    fn applied(message: impl Into<String>) -> Self {
        ExecutionOutcome::Applied {
            message: message.into(),
        }
    }

    fn fizzled(message: impl Into<String>) -> Self {
        ExecutionOutcome::Fizzled {
            message: message.into(),
        }
    }
}

/// Cards an executor will act on
enum Picked {
    Cards(Vec<CardId>),
    Select(SelectionRequest),
    Nothing(String),
}

impl GameState {
    /// Players a selector designates, seen from `controller`
    pub(crate) fn players_for(&self, who: Who, controller: PlayerId) -> SmallVec<[PlayerId; 2]> {
        self.players
            .iter()
            .map(|p| p.id)
            .filter(|&p| who.includes(controller, p))
            .collect()
    }

    /// Every card `spec` could designate for an effect controlled by `controller`
    pub(crate) fn target_candidates(
        &self,
        controller: PlayerId,
        spec: &TargetSpec,
        exclude: Option<CardId>,
    ) -> Vec<CardId> {
        let TargetSelector::Card { owner, zone, filter } = &spec.selector else {
            return Vec::new();
        };
        self.players_for(*owner, controller)
            .into_iter()
            .flat_map(|p| self.cards_in_zone(p, *zone))
            .filter(|&c| Some(c) != exclude)
            .filter(|&c| self.cards.get(c).is_ok_and(|card| filter.matches(card)))
            .collect()
    }

    fn pick_cards(
        &self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
        always_choose: bool,
    ) -> Result<Picked> {
        let Some(spec) = link.effect.target.as_ref() else {
            return Ok(Picked::Nothing("the effect names no cards".to_string()));
        };
        match &spec.selector {
            TargetSelector::ThisCard => Ok(Picked::Cards(vec![link.source])),
            TargetSelector::EventCard => Ok(match link.event_card {
                Some(card) => Picked::Cards(vec![card]),
                None => Picked::Nothing("there is no triggering card".to_string()),
            }),
            TargetSelector::Player(_) | TargetSelector::ChainLink => {
                Ok(Picked::Nothing("the effect does not act on cards".to_string()))
            }
            TargetSelector::Card { .. } => {
                let candidates = self.target_candidates(link.controller, spec, Some(link.source));

                if spec.declared && !link.targets.is_empty() {
                    let still_valid: Vec<CardId> = link
                        .targets
                        .iter()
                        .filter_map(|t| match t {
                            TargetRef::Card(card) => Some(*card),
                            _ => None,
                        })
                        .filter(|c| candidates.contains(c))
                        .collect();
                    return Ok(if still_valid.is_empty() {
                        Picked::Nothing("the targets are no longer valid".to_string())
                    } else {
                        Picked::Cards(still_valid)
                    });
                }

                if candidates.is_empty() {
                    return Ok(Picked::Nothing("there are no valid cards".to_string()));
                }
                if spec.all {
                    return Ok(Picked::Cards(candidates));
                }

                let max = (spec.count as usize).min(candidates.len());
                let min = spec.min_choices().min(max);
                let request = SelectionRequest {
                    available: candidates,
                    min,
                    max,
                    prompt: format!(
                        "choose {}{} card(s) for {}",
                        if spec.up_to { "up to " } else { "" },
                        max,
                        link.effect.kind.name()
                    ),
                };
                if let Some(choices) = selection {
                    request.validate(choices)?;
                    return Ok(Picked::Cards(choices.to_vec()));
                }
                if !always_choose && !spec.up_to && request.available.len() <= max {
                    return Ok(Picked::Cards(request.available));
                }
                Ok(Picked::Select(request))
            }
        }
    }

    fn link_players(&self, link: &ChainLink) -> SmallVec<[PlayerId; 2]> {
        match link.effect.target.as_ref().map(|t| &t.selector) {
            Some(TargetSelector::Player(who)) => self.players_for(*who, link.controller),
            _ => SmallVec::from_elem(link.controller, 1),
        }
    }

    /// Run the effect of `link`; `selection` answers an earlier `RequiresSelection`
    pub fn execute(
        &mut self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        // Activating a continuous card only turns it on; its effect applies while face-up
        if link.effect.continuous {
            return Ok(ExecutionOutcome::applied(format!(
                "card {} is now active",
                link.source
            )));
        }
        let outcome = match link.effect.kind {
            EffectKind::Draw => self.exec_draw(link)?,
            EffectKind::Destroy => self.exec_destroy(link, selection)?,
            EffectKind::Damage => self.exec_life(link, -link.effect.amount())?,
            EffectKind::Heal => self.exec_life(link, link.effect.amount())?,
            EffectKind::Search => self.exec_move(link, selection, Zone::Hand, true)?,
            EffectKind::SpecialSummon => self.exec_special_summon(link, selection)?,
            EffectKind::Negate => self.exec_negate(link)?,
            EffectKind::Banish => self.exec_move(link, selection, Zone::Banished, false)?,
            EffectKind::Mill => self.exec_mill(link)?,
            EffectKind::Discard => self.exec_discard(link, selection)?,
            EffectKind::ModifyStat(stat) => self.exec_modify_stat(link, stat, selection)?,
            EffectKind::ZoneMove(zone) => self.exec_move(link, selection, zone, false)?,
            EffectKind::Protect(protection) => self.exec_protect(link, protection, selection)?,
            EffectKind::Restrict(action) => self.exec_restrict(link, action),
        };
        game_log!(self, Verbose, "executor", "{} for link {}: {:?}", link.effect.kind.name(), link.index, outcome);
        Ok(outcome)
    }

    fn exec_draw(&mut self, link: &ChainLink) -> Result<ExecutionOutcome> {
        let count = link.effect.amount().max(0) as usize;
        let mut drawn = 0;
        for player in self.link_players(link) {
            for _ in 0..count {
                if self.draw(player)?.is_none() {
                    break;
                }
                drawn += 1;
            }
        }
        Ok(ExecutionOutcome::applied(format!("drew {drawn} card(s)")))
    }

    fn exec_life(&mut self, link: &ChainLink, delta: i32) -> Result<ExecutionOutcome> {
        let players = self.link_players(link);
        for &player in &players {
            self.change_life(player, delta)?;
        }
        let verb = if delta < 0 { "inflicted" } else { "gained" };
        Ok(ExecutionOutcome::applied(format!(
            "{} {} LP ({} player(s))",
            verb,
            delta.abs(),
            players.len()
        )))
    }

    fn exec_destroy(
        &mut self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        let cards = match self.pick_cards(link, selection, false)? {
            Picked::Cards(cards) => cards,
            Picked::Select(request) => return Ok(ExecutionOutcome::RequiresSelection(request)),
            Picked::Nothing(reason) => return Ok(ExecutionOutcome::fizzled(reason)),
        };
        let mut destroyed = 0;
        for card in cards {
            if self.zone_of(card).is_some_and(|z| z.is_field()) && self.destroy_card(card, false)? {
                destroyed += 1;
            }
        }
        if destroyed == 0 {
            return Ok(ExecutionOutcome::fizzled("nothing was destroyed"));
        }
        Ok(ExecutionOutcome::applied(format!("destroyed {destroyed} card(s)")))
    }

    /// Search, banish and zone moves
    fn exec_move(
        &mut self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
        to: Zone,
        always_choose: bool,
    ) -> Result<ExecutionOutcome> {
        let cards = match self.pick_cards(link, selection, always_choose)? {
            Picked::Cards(cards) => cards,
            Picked::Select(request) => return Ok(ExecutionOutcome::RequiresSelection(request)),
            Picked::Nothing(reason) => return Ok(ExecutionOutcome::fizzled(reason)),
        };
        let mut moved = 0;
        for card in cards {
            match self.zone_of(card) {
                Some(zone) if zone != to => {
                    self.move_card(card, to)?;
                    moved += 1;
                }
                _ => {}
            }
        }
        if moved == 0 {
            return Ok(ExecutionOutcome::fizzled("no card could be moved"));
        }
        Ok(ExecutionOutcome::applied(format!("moved {moved} card(s) to {to:?}")))
    }

    fn exec_special_summon(
        &mut self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        let controller = link.controller;
        let check = self
            .lingering
            .is_action_prevented(ActionKind::SpecialSummon, controller);
        if check.prevented {
            return Ok(ExecutionOutcome::fizzled(check.reason.unwrap_or_default()));
        }
        let free = self
            .config
            .max_board_slots
            .saturating_sub(self.zones(controller)?.board.len());
        if free == 0 {
            return Ok(ExecutionOutcome::fizzled("no free monster slot"));
        }

        let cards = match link.effect.target.as_ref().map(|t| &t.selector) {
            Some(TargetSelector::ThisCard) => {
                if matches!(self.zone_of(link.source), Some(z) if !z.is_field()) {
                    vec![link.source]
                } else {
                    return Ok(ExecutionOutcome::fizzled("this card cannot be summoned from where it is"));
                }
            }
            _ => match self.pick_cards(link, selection, true)? {
                Picked::Cards(cards) => cards,
                Picked::Select(mut request) => {
                    request.available.retain(|&c| {
                        self.cards.get(c).is_ok_and(|card| card.owner == controller)
                    });
                    if request.available.is_empty() {
                        return Ok(ExecutionOutcome::fizzled("no monster can be summoned"));
                    }
                    request.max = request.max.min(free).min(request.available.len());
                    request.min = request.min.min(request.max);
                    return Ok(ExecutionOutcome::RequiresSelection(request));
                }
                Picked::Nothing(reason) => return Ok(ExecutionOutcome::fizzled(reason)),
            },
        };

        let turn = self.turn.turn_number;
        let mut summoned = 0;
        for card in cards.into_iter().take(free) {
            let source_zone = self.zone_of(card);
            let eligible = self
                .cards
                .get(card)
                .is_ok_and(|c| c.is_monster() && c.owner == controller);
            if !eligible || !source_zone.is_some_and(|z| !z.is_field()) {
                continue;
            }
            let zones = self.zones_mut(controller)?;
            zones.remove(card);
            let mut slot = BoardCard::new(card, Stance::Offense, Face::Up, turn);
            slot.has_acted = true;
            zones.board.push(slot);
            self.record(GameEvent::SpecialSummoned {
                player: controller,
                card,
            });
            game_log!(self, Normal, "summon", "player {} special summons card {}", controller, card);
            summoned += 1;
        }
        if summoned == 0 {
            return Ok(ExecutionOutcome::fizzled("no monster could be summoned"));
        }
        Ok(ExecutionOutcome::applied(format!("special summoned {summoned} monster(s)")))
    }

    fn exec_negate(&mut self, link: &ChainLink) -> Result<ExecutionOutcome> {
        let declared = link.targets.iter().find_map(|t| match t {
            TargetRef::ChainLink(index) => Some(*index),
            _ => None,
        });
        let index = match declared.or_else(|| self.chain.top().map(|l| l.index)) {
            Some(index) => index,
            None => return Ok(ExecutionOutcome::fizzled("there is nothing to negate")),
        };
        match self.chain.get_mut(index) {
            Some(target) => {
                target.negated = true;
                Ok(ExecutionOutcome::applied(format!("negated chain link {index}")))
            }
            None => Ok(ExecutionOutcome::fizzled(format!("chain link {index} already left the chain"))),
        }
    }

    fn exec_mill(&mut self, link: &ChainLink) -> Result<ExecutionOutcome> {
        let count = link.effect.amount().max(0) as usize;
        let mut milled = 0;
        for player in self.link_players(link) {
            for _ in 0..count {
                let Some(top) = self.zones(player)?.deck.peek_top() else {
                    break;
                };
                self.move_card(top, Zone::Graveyard)?;
                milled += 1;
            }
        }
        if milled == 0 {
            return Ok(ExecutionOutcome::fizzled("the deck is empty"));
        }
        Ok(ExecutionOutcome::applied(format!("sent {milled} card(s) from the deck to the graveyard")))
    }

    /// The controller picks from their own hand; an opponent discards at random
    fn exec_discard(
        &mut self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        let count = link.effect.amount().max(0) as usize;
        let controller = link.controller;
        let players = self.link_players(link);

        let own_hand = self.cards_in_zone(controller, Zone::Hand);
        let own_choice = if players.contains(&controller) {
            let request = SelectionRequest {
                min: count.min(own_hand.len()),
                max: count.min(own_hand.len()),
                available: own_hand.clone(),
                prompt: format!("discard {count} card(s)"),
            };
            match selection {
                Some(choices) => {
                    request.validate(choices)?;
                    choices.to_vec()
                }
                None if own_hand.len() <= count => own_hand,
                None => return Ok(ExecutionOutcome::RequiresSelection(request)),
            }
        } else {
            Vec::new()
        };

        let mut discarded = Vec::new();
        for player in players {
            let picks = if player == controller {
                own_choice.clone()
            } else {
                let hand = self.cards_in_zone(player, Zone::Hand);
                hand.choose_multiple(&mut self.rng, count).copied().collect()
            };
            for card in picks {
                self.move_card(card, Zone::Graveyard)?;
                self.record(GameEvent::Discarded { player, card });
                discarded.push(card);
            }
        }
        if discarded.is_empty() {
            return Ok(ExecutionOutcome::fizzled("no card to discard"));
        }
        Ok(ExecutionOutcome::applied(format!("discarded {} card(s)", discarded.len())))
    }

    /// Cards on the board a temporary modifier applies to
    fn pick_board_cards(
        &self,
        link: &ChainLink,
        selection: Option<&[CardId]>,
    ) -> Result<Picked> {
        Ok(match self.pick_cards(link, selection, false)? {
            Picked::Cards(cards) => {
                let on_board: Vec<CardId> = cards
                    .into_iter()
                    .filter(|&c| self.board_card(c).is_some())
                    .collect();
                if on_board.is_empty() {
                    Picked::Nothing("no monster on the field to affect".to_string())
                } else {
                    Picked::Cards(on_board)
                }
            }
            other => other,
        })
    }

    fn exec_modify_stat(
        &mut self,
        link: &ChainLink,
        stat: Stat,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        let cards = match self.pick_board_cards(link, selection)? {
            Picked::Cards(cards) => cards,
            Picked::Select(request) => return Ok(ExecutionOutcome::RequiresSelection(request)),
            Picked::Nothing(reason) => return Ok(ExecutionOutcome::fizzled(reason)),
        };
        let amount = link.effect.amount();
        let scope = link.effect.duration.unwrap_or(ExpiryScope::Turn);
        for &card in &cards {
            self.register_lingering(
                link.source,
                link.controller,
                LingeringPayload::StatModifier { card, stat, amount },
                scope,
            );
        }
        Ok(ExecutionOutcome::applied(format!(
            "{:+} {:?} for {} monster(s)",
            amount,
            stat,
            cards.len()
        )))
    }

    fn exec_protect(
        &mut self,
        link: &ChainLink,
        protection: Protection,
        selection: Option<&[CardId]>,
    ) -> Result<ExecutionOutcome> {
        let cards = match self.pick_board_cards(link, selection)? {
            Picked::Cards(cards) => cards,
            Picked::Select(request) => return Ok(ExecutionOutcome::RequiresSelection(request)),
            Picked::Nothing(reason) => return Ok(ExecutionOutcome::fizzled(reason)),
        };
        let scope = link.effect.duration.unwrap_or(ExpiryScope::Turn);
        for &card in &cards {
            self.register_lingering(
                link.source,
                link.controller,
                LingeringPayload::Protection { card, protection },
                scope,
            );
        }
        Ok(ExecutionOutcome::applied(format!(
            "{:?} granted to {} monster(s)",
            protection,
            cards.len()
        )))
    }

    fn exec_restrict(&mut self, link: &ChainLink, action: ActionKind) -> ExecutionOutcome {
        let scope = link.effect.duration.unwrap_or(ExpiryScope::Turn);
        let affected = self.link_players(link);
        for &player in &affected {
            self.register_lingering(
                link.source,
                link.controller,
                LingeringPayload::Prevention {
                    action,
                    affected: player,
                },
                scope,
            );
        }
        ExecutionOutcome::applied(format!(
            "{} player(s) cannot {}",
            affected.len(),
            action.describe()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::{CardDefinition, ParsedEffect, SpellKind, Targets};
    use crate::game::SpellSpeed;

    struct Fixture {
        game: GameState,
        p1: PlayerId,
        p2: PlayerId,
    }

    fn fixture() -> Fixture {
        let mut game = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
        game.logger.enable_capture();
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        Fixture { game, p1, p2 }
    }

    fn monster(name: &str, level: u8, atk: i32) -> CardDefinition {
        CardDefinition::monster(100, name, level, atk, 1000)
    }

    fn link_for(game: &mut GameState, owner: PlayerId, ability: &str) -> ChainLink {
        let def = CardDefinition::spell(900, "Test Spell", SpellKind::Normal).with_ability(ability);
        let source = game.add_card_to_zone(&def, owner, Zone::Graveyard).unwrap();
        let effect = game.cards.get(source).unwrap().effects[0].clone();
        ChainLink {
            index: 1,
            source,
            effect_index: 0,
            controller: owner,
            speed: SpellSpeed::One,
            effect,
            targets: Targets::new(),
            negated: false,
            triggered: false,
            event_card: None,
        }
    }

    #[test]
    fn test_draw_and_damage() {
        let Fixture { mut game, p1, p2 } = fixture();
        for _ in 0..3 {
            game.add_card_to_zone(&monster("Filler", 1, 100), p1, Zone::Deck).unwrap();
        }
        let link = link_for(&mut game, p1, "Draw 2 cards.");
        let outcome = game.execute(&link, None).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Applied { .. }));
        assert_eq!(game.zones(p1).unwrap().hand.len(), 2);

        let link = link_for(&mut game, p1, "Inflict 800 damage to your opponent.");
        game.execute(&link, None).unwrap();
        assert_eq!(game.player(p2).unwrap().life, 7200);
        assert_eq!(game.player(p1).unwrap().life, 8000);
    }

    #[test]
    fn test_search_requires_selection_then_mutates() {
        let Fixture { mut game, p1, .. } = fixture();
        let a = game.add_card_to_zone(&monster("Scout A", 3, 1200), p1, Zone::Deck).unwrap();
        let b = game.add_card_to_zone(&monster("Scout B", 3, 1300), p1, Zone::Deck).unwrap();
        let link = link_for(&mut game, p1, "Add 1 monster from your deck to your hand.");

        let before = game.zones(p1).unwrap().deck.cards.clone();
        let request = match game.execute(&link, None).unwrap() {
            ExecutionOutcome::RequiresSelection(request) => request,
            other => panic!("expected selection, got {other:?}"),
        };
        assert_eq!(request.min, 1);
        assert_eq!(request.max, 1);
        assert!(request.available.contains(&a) && request.available.contains(&b));
        assert_eq!(game.zones(p1).unwrap().deck.cards, before);

        game.execute(&link, Some(&[b])).unwrap();
        assert_eq!(game.zone_of(b), Some(Zone::Hand));
        assert_eq!(game.zone_of(a), Some(Zone::Deck));
    }

    #[test]
    fn test_destroy_fizzles_without_targets() {
        let Fixture { mut game, p1, .. } = fixture();
        let link = link_for(&mut game, p1, "Destroy 1 monster your opponent controls.");
        let outcome = game.execute(&link, None).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Fizzled { .. }));
    }

    #[test]
    fn test_destroy_single_candidate_without_choice() {
        let Fixture { mut game, p1, p2 } = fixture();
        let victim = game.add_card_to_zone(&monster("Victim", 4, 1000), p2, Zone::Board).unwrap();
        let link = link_for(&mut game, p1, "Destroy 1 monster your opponent controls.");
        let outcome = game.execute(&link, None).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Applied { .. }));
        assert_eq!(game.zone_of(victim), Some(Zone::Graveyard));
    }

    #[test]
    fn test_special_summon_respects_board_limit() {
        let Fixture { mut game, p1, .. } = fixture();
        for _ in 0..5 {
            game.add_card_to_zone(&monster("Wall", 1, 0), p1, Zone::Board).unwrap();
        }
        let revived = game.add_card_to_zone(&monster("Phoenix", 4, 1800), p1, Zone::Graveyard).unwrap();
        let link = link_for(&mut game, p1, "Special Summon 1 monster from your graveyard.");
        let outcome = game.execute(&link, None).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Fizzled { .. }));
        assert_eq!(game.zone_of(revived), Some(Zone::Graveyard));

        game.zones_mut(p1).unwrap().board.pop();
        let request = match game.execute(&link, None).unwrap() {
            ExecutionOutcome::RequiresSelection(request) => request,
            other => panic!("expected selection, got {other:?}"),
        };
        assert_eq!(request.available, vec![revived]);
        game.execute(&link, Some(&[revived])).unwrap();
        let slot = game.board_card(revived).unwrap();
        assert!(slot.has_acted);
        assert!(slot.is_face_up());
    }

    #[test]
    fn test_opponent_discard_is_random_and_own_needs_choice() {
        let Fixture { mut game, p1, p2 } = fixture();
        for _ in 0..3 {
            game.add_card_to_zone(&monster("Filler", 1, 100), p2, Zone::Hand).unwrap();
            game.add_card_to_zone(&monster("Filler", 1, 100), p1, Zone::Hand).unwrap();
        }
        let link = link_for(&mut game, p1, "Your opponent discards 1 card.");
        game.execute(&link, None).unwrap();
        assert_eq!(game.zones(p2).unwrap().hand.len(), 2);
        assert_eq!(game.zones(p2).unwrap().graveyard.len(), 1);

        let link = link_for(&mut game, p1, "Discard 1 card.");
        let outcome = game.execute(&link, None).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::RequiresSelection(_)));
        assert_eq!(game.zones(p1).unwrap().hand.len(), 3);
    }

    #[test]
    fn test_negate_marks_link() {
        let Fixture { mut game, p1, p2 } = fixture();
        let target = game.add_card_to_zone(&monster("Caster", 4, 1000), p2, Zone::Graveyard).unwrap();
        game.chain
            .add_link(target, 0, p2, SpellSpeed::One, ParsedEffect::new(EffectKind::Draw), Targets::new(), None)
            .unwrap();
        let link = link_for(&mut game, p1, "Negate the activation.");
        game.execute(&link, None).unwrap();
        assert!(game.chain.get(1).unwrap().negated);
        assert_eq!(game.chain.len(), 1);
    }

    #[test]
    fn test_restrict_registers_prevention() {
        let Fixture { mut game, p1, p2 } = fixture();
        let link = link_for(&mut game, p1, "Your opponent cannot activate Spell Cards this turn.");
        game.execute(&link, None).unwrap();
        assert!(game.lingering.is_action_prevented(ActionKind::ActivateSpell, p2).prevented);
        assert!(!game.lingering.is_action_prevented(ActionKind::ActivateSpell, p1).prevented);
    }
}
