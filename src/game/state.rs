//! Main game state structure

use crate::config::RulesConfig;
use crate::core::{
    Card, CardDefinition, CardId, EffectKind, EntityId, EntityStore, ParsedEffect, Player,
    PlayerId, Protection, Stat, TargetSelector,
};
use crate::game::{Chain, CombatState, EventLog, GameEvent, GameLogger, LingeringRegistry, OptTracker};
use crate::game::{PendingSelection, TurnStructure};
use crate::zones::{BoardCard, Face, PlayerZones, SpellTrapSlot, Stance, Zone};
use crate::{game_log, DuelError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Complete duel snapshot
///
/// This is the aggregate every rules operation reads and writes. It clones
/// cheaply enough that command application works on a copy and the caller's
/// snapshot is never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// All cards in the game
    pub cards: EntityStore<Card>,

    /// Both players, in seat order
    pub players: Vec<Player>,

    /// Zones for each player
    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    pub turn: TurnStructure,

    /// Pending effects, last declared on top
    pub chain: Chain,

    pub opt: OptTracker,

    pub lingering: LingeringRegistry,

    /// The attack currently waiting for damage calculation, if any
    pub combat: CombatState,

    pub events: EventLog,

    /// A chain link suspended until its controller chooses cards
    pub pending_selection: Option<PendingSelection>,

    /// Deck shuffles and random discards (serializable for deterministic replay)
    pub rng: ChaCha12Rng,

    pub config: RulesConfig,

    /// Unified entity ID generator (shared across all entity types)
    next_entity_id: u32,

    /// Centralized logger for game events
    pub logger: GameLogger,
}

impl GameState {
    /// Create a new duel; the first player starts in their draw phase
    pub fn new_two_player(
        player1_name: impl Into<String>,
        player2_name: impl Into<String>,
        config: RulesConfig,
    ) -> Self {
        let p1_id = PlayerId::new(0);
        let p2_id = PlayerId::new(1);

        let name1: String = player1_name.into();
        let name2: String = player2_name.into();
        let mut player1 = Player::new(p1_id, name1, config.starting_life);
        let mut player2 = Player::new(p2_id, name2, config.starting_life);
        player1.resources = config.starting_resources;
        player2.resources = config.starting_resources;

        GameState {
            cards: EntityStore::new(),
            players: vec![player1, player2],
            player_zones: vec![(p1_id, PlayerZones::new(p1_id)), (p2_id, PlayerZones::new(p2_id))],
            turn: TurnStructure::new(p1_id),
            chain: Chain::new(),
            opt: OptTracker::new(),
            lingering: LingeringRegistry::new(),
            combat: CombatState::new(),
            events: EventLog::new(),
            pending_selection: None,
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            config,
            next_entity_id: 2,
            logger: GameLogger::new(),
        }
    }

    /// Get next entity ID (unified across all entity types)
    pub fn next_id<T>(&mut self) -> EntityId<T> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn next_card_id(&mut self) -> CardId {
        self.next_id()
    }

    /// Instantiate `definition` for `owner` and place it in `zone`
    ///
    /// Monsters placed on the board arrive face-up in offense stance, spells
    /// and traps placed in the spell/trap zone arrive set. Used for deck
    /// building and test setups; it records no events.
    pub fn add_card_to_zone(
        &mut self,
        definition: &CardDefinition,
        owner: PlayerId,
        zone: Zone,
    ) -> Result<CardId> {
        let id = self.next_card_id();
        let card = definition.instantiate(id, owner);
        let turn = self.turn.turn_number;
        let zones = self.zones_mut(owner)?;
        match zone {
            Zone::Board => zones
                .board
                .push(BoardCard::new(id, Stance::Offense, Face::Up, turn)),
            Zone::SpellTrap => zones.spell_trap.push(SpellTrapSlot::set(id, turn)),
            Zone::FieldSlot => zones.field = Some(SpellTrapSlot::face_up(id, turn)),
            pile => {
                if let Some(z) = zones.get_zone_mut(pile) {
                    z.add(id);
                }
            }
        }
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Get player zones for a specific player
    pub fn zones(&self, player_id: PlayerId) -> Result<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or_else(|| DuelError::InvalidMove(format!("unknown player {player_id}")))
    }

    pub fn zones_mut(&mut self, player_id: PlayerId) -> Result<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
            .ok_or_else(|| DuelError::InvalidMove(format!("unknown player {player_id}")))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DuelError::InvalidMove(format!("unknown player {id}")))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DuelError::InvalidMove(format!("unknown player {id}")))
    }

    /// The other seat of the duel
    pub fn opponent_of(&self, player: PlayerId) -> PlayerId {
        self.players
            .iter()
            .find(|p| p.id != player)
            .map(|p| p.id)
            .unwrap_or(player)
    }

    /// Record a domain event at the current turn and phase
    pub fn record(&mut self, event: GameEvent) -> u64 {
        self.events
            .record(self.turn.turn_number, self.turn.current_phase, event)
    }

    /// Zone currently holding `card`
    pub fn zone_of(&self, card: CardId) -> Option<Zone> {
        let owner = self.cards.get(card).ok()?.owner;
        self.zones(owner).ok()?.locate(card)
    }

    /// Fail with `CardNotInExpectedZone` unless `card` sits in `zone`
    pub fn expect_zone(&self, card: CardId, zone: Zone) -> Result<()> {
        match self.zone_of(card) {
            Some(z) if z == zone => Ok(()),
            other => Err(DuelError::CardNotInExpectedZone {
                card: card.as_u32(),
                reason: match other {
                    Some(z) => format!("expected {zone:?}, found in {z:?}"),
                    None => format!("expected {zone:?}, not in any zone"),
                },
            }),
        }
    }

    /// Ids of `player`'s cards in `zone`, in zone order
    pub fn cards_in_zone(&self, player: PlayerId, zone: Zone) -> Vec<CardId> {
        let Ok(zones) = self.zones(player) else {
            return Vec::new();
        };
        match zone {
            Zone::Board => zones.board.iter().map(|b| b.card).collect(),
            Zone::SpellTrap => zones
                .spell_trap
                .iter()
                .chain(zones.field.iter())
                .map(|s| s.card)
                .collect(),
            Zone::FieldSlot => zones.field.iter().map(|s| s.card).collect(),
            pile => zones
                .get_zone(pile)
                .map(|z| z.cards.clone())
                .unwrap_or_default(),
        }
    }

    pub fn board_card(&self, card: CardId) -> Option<&BoardCard> {
        let owner = self.cards.get(card).ok()?.owner;
        self.zones(owner).ok()?.board_card(card)
    }

    pub fn spell_trap_slot(&self, card: CardId) -> Option<&SpellTrapSlot> {
        let owner = self.cards.get(card).ok()?.owner;
        self.zones(owner).ok()?.spell_trap_slot(card)
    }

    /// Is `card` face-up in a monster, spell/trap or field slot?
    pub fn is_face_up_on_field(&self, card: CardId) -> bool {
        self.board_card(card).is_some_and(BoardCard::is_face_up)
            || self.spell_trap_slot(card).is_some_and(SpellTrapSlot::is_face_up)
    }

    /// Move `card` from wherever it is into a pile zone (hand, deck, graveyard, banished)
    ///
    /// Cards always move to their owner's zones. Moving into the deck shuffles it.
    pub fn move_card(&mut self, card: CardId, to: Zone) -> Result<Zone> {
        if to.is_field() {
            return Err(DuelError::InvalidMove(format!(
                "card {card} cannot be moved onto the field directly"
            )));
        }
        let owner = self.cards.get(card)?.owner;
        let from = self.zones_mut(owner)?.remove(card).ok_or_else(|| {
            DuelError::CardNotInExpectedZone {
                card: card.as_u32(),
                reason: "card is not in any zone".to_string(),
            }
        })?;

        {
            let zones = self.zones_mut(owner)?;
            if let Some(pile) = zones.get_zone_mut(to) {
                pile.add(card);
            }
        }
        if to == Zone::Deck {
            let zones = self
                .player_zones
                .iter_mut()
                .find(|(id, _)| *id == owner)
                .map(|(_, z)| z);
            if let Some(zones) = zones {
                zones.deck.shuffle(&mut self.rng);
            }
        }

        if from.is_field() {
            self.lingering.remove_for_card(card);
            self.combat.forget(card);
        }

        let event = if to == Zone::Graveyard {
            GameEvent::SentToGraveyard { owner, card, from }
        } else {
            GameEvent::CardMoved {
                owner,
                card,
                from,
                to,
            }
        };
        self.record(event);
        game_log!(self, Verbose, "zone", "card {} moved {:?} -> {:?}", card, from, to);
        Ok(from)
    }

    /// Destroy a card on the field
    ///
    /// Returns `false` without moving anything when the card is protected.
    pub fn destroy_card(&mut self, card: CardId, by_battle: bool) -> Result<bool> {
        let zone = self.zone_of(card);
        if !zone.is_some_and(|z| z.is_field()) {
            return Err(DuelError::CardNotInExpectedZone {
                card: card.as_u32(),
                reason: "only cards on the field can be destroyed".to_string(),
            });
        }
        let protection = if by_battle {
            Protection::BattleDestruction
        } else {
            Protection::EffectDestruction
        };
        if self.has_protection(card, protection)? {
            game_log!(self, Normal, "zone", "card {} survives ({:?})", card, protection);
            return Ok(false);
        }

        let owner = self.cards.get(card)?.owner;
        self.record(GameEvent::CardDestroyed {
            owner,
            card,
            by_battle,
        });
        self.move_card(card, Zone::Graveyard)?;
        Ok(true)
    }

    /// Draw the top card; drawing from an empty deck loses the duel
    pub fn draw(&mut self, player: PlayerId) -> Result<Option<CardId>> {
        let drawn = {
            let zones = self.zones_mut(player)?;
            let top = zones.deck.draw_top();
            if let Some(card) = top {
                zones.hand.add(card);
            }
            top
        };

        match drawn {
            Some(card) => {
                self.record(GameEvent::CardDrawn { player, card });
                Ok(Some(card))
            }
            None => {
                let p = self.player_mut(player)?;
                if !p.has_lost {
                    p.has_lost = true;
                    self.record(GameEvent::PlayerLost { player });
                    game_log!(self, Minimal, "duel", "player {} cannot draw and loses", player);
                }
                Ok(None)
            }
        }
    }

    /// Apply a life-point change and record it
    pub fn change_life(&mut self, player: PlayerId, delta: i32) -> Result<()> {
        let (life, lost_now) = {
            let p = self.player_mut(player)?;
            let had_lost = p.has_lost;
            if delta >= 0 {
                p.gain_life(delta);
            } else {
                p.lose_life(-delta);
            }
            (p.life, p.has_lost && !had_lost)
        };
        self.record(GameEvent::LifeChanged {
            player,
            delta,
            life,
        });
        if lost_now {
            self.record(GameEvent::PlayerLost { player });
            game_log!(self, Minimal, "duel", "player {} has no life points left", player);
        }
        Ok(())
    }

    /// Face-up cards whose effects currently apply, with their continuous effects
    fn continuous_effects(&self) -> impl Iterator<Item = (&Card, &ParsedEffect)> + '_ {
        self.player_zones
            .iter()
            .flat_map(|(_, zones)| {
                zones
                    .board
                    .iter()
                    .filter(|b| b.is_face_up())
                    .map(|b| b.card)
                    .chain(
                        zones
                            .spell_trap
                            .iter()
                            .chain(zones.field.iter())
                            .filter(|s| s.is_face_up())
                            .map(|s| s.card),
                    )
            })
            .filter_map(move |id| self.cards.get(id).ok())
            .flat_map(|card| {
                card.effects
                    .iter()
                    .filter(|e| e.continuous)
                    .map(move |e| (card, e))
            })
    }

    /// Does a continuous effect of `source` cover the monster `card`?
    fn continuous_covers(&self, source: &Card, effect: &ParsedEffect, card: &Card) -> bool {
        match effect.target.as_ref().map(|t| &t.selector) {
            Some(TargetSelector::ThisCard) | None => source.id == card.id,
            Some(TargetSelector::Card { owner, filter, .. }) => {
                owner.includes(source.owner, card.owner)
                    && filter.matches(card)
                    && self.board_card(card.id).is_some_and(BoardCard::is_face_up)
            }
            Some(_) => false,
        }
    }

    fn effective_stat(&self, card_id: CardId, stat: Stat) -> Result<i32> {
        let card = self.cards.get(card_id)?;
        let base = match stat {
            Stat::Attack => card.attack,
            Stat::Defense => card.defense,
        };
        let continuous: i32 = self
            .continuous_effects()
            .filter(|(_, e)| e.kind == EffectKind::ModifyStat(stat))
            .filter(|(source, e)| self.continuous_covers(source, e, card))
            .map(|(_, e)| e.amount())
            .sum();
        let total = base + self.lingering.stat_bonus(card_id, stat) + continuous;
        Ok(total.max(0))
    }

    /// Printed ATK plus lingering and continuous modifiers
    pub fn effective_attack(&self, card: CardId) -> Result<i32> {
        self.effective_stat(card, Stat::Attack)
    }

    pub fn effective_defense(&self, card: CardId) -> Result<i32> {
        self.effective_stat(card, Stat::Defense)
    }

    /// Is `card` protected, by a lingering grant or a face-up continuous effect?
    pub fn has_protection(&self, card_id: CardId, protection: Protection) -> Result<bool> {
        if self.lingering.has_protection(card_id, protection) {
            return Ok(true);
        }
        let card = self.cards.get(card_id)?;
        Ok(self
            .continuous_effects()
            .filter(|(_, e)| e.kind == EffectKind::Protect(protection))
            .any(|(source, e)| self.continuous_covers(source, e, card)))
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.players.iter().any(|p| p.has_lost)
    }

    /// Get the winner (if game is over)
    pub fn get_winner(&self) -> Option<PlayerId> {
        if !self.is_game_over() {
            return None;
        }
        let standing: Vec<_> = self.players.iter().filter(|p| !p.has_lost).collect();
        match standing.as_slice() {
            [winner] => Some(winner.id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpellKind;
    use crate::game::Phase;

    fn game() -> GameState {
        let mut game = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
        game.logger.enable_capture();
        game
    }

    #[test]
    fn test_game_creation() {
        let game = game();
        assert_eq!(game.players.len(), 2);
        assert_eq!(game.player_zones.len(), 2);
        assert_eq!(game.turn.turn_number, 1);
        assert_eq!(game.turn.current_phase, Phase::Draw);
        assert_eq!(game.players[0].life, 8000);
        assert!(game.chain.is_empty());
    }

    #[test]
    fn test_draw_card() {
        let mut game = game();
        let p1 = game.players[0].id;
        let def = CardDefinition::monster(1, "Gearbolt Sentinel", 4, 1800, 1200);
        let card = game.add_card_to_zone(&def, p1, Zone::Deck).unwrap();

        assert_eq!(game.draw(p1).unwrap(), Some(card));
        assert_eq!(game.zone_of(card), Some(Zone::Hand));
        assert!(matches!(
            game.events.records().last().unwrap().event,
            GameEvent::CardDrawn { .. }
        ));

        // Deck-out
        assert_eq!(game.draw(p1).unwrap(), None);
        assert!(game.players[0].has_lost);
        assert_eq!(game.get_winner(), Some(game.players[1].id));
    }

    #[test]
    fn test_destroy_respects_protection() {
        let mut game = game();
        let p1 = game.players[0].id;
        let wall = CardDefinition::monster(2, "Bastion Golem", 4, 0, 2000)
            .with_ability("This card cannot be destroyed by battle.");
        let card = game.add_card_to_zone(&wall, p1, Zone::Board).unwrap();

        assert!(!game.destroy_card(card, true).unwrap());
        assert_eq!(game.zone_of(card), Some(Zone::Board));

        assert!(game.destroy_card(card, false).unwrap());
        assert_eq!(game.zone_of(card), Some(Zone::Graveyard));
        let kinds: Vec<_> = game.events.records().iter().map(|r| r.event.kind_name()).collect();
        assert_eq!(kinds, vec!["on_destroy", "on_sent_to_graveyard"]);
    }

    #[test]
    fn test_destroy_requires_field() {
        let mut game = game();
        let p1 = game.players[0].id;
        let def = CardDefinition::monster(1, "Gearbolt Sentinel", 4, 1800, 1200);
        let card = game.add_card_to_zone(&def, p1, Zone::Hand).unwrap();
        let err = game.destroy_card(card, false).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CardNotInExpectedZone);
    }

    #[test]
    fn test_effective_stats_include_field_spell() {
        let mut game = game();
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        let knight = CardDefinition::monster(3, "Dragon Knight Squire", 4, 1500, 1000)
            .with_archetype("Dragon Knight");
        let mine = game.add_card_to_zone(&knight, p1, Zone::Board).unwrap();
        let theirs = game.add_card_to_zone(&knight, p2, Zone::Board).unwrap();

        let banner = CardDefinition::spell(4, "Dragon Knight Banner", SpellKind::Field)
            .with_ability("All \"Dragon Knight\" monsters you control gain 500 ATK.");
        game.add_card_to_zone(&banner, p1, Zone::FieldSlot).unwrap();

        assert_eq!(game.effective_attack(mine).unwrap(), 2000);
        assert_eq!(game.effective_attack(theirs).unwrap(), 1500);
        assert_eq!(game.effective_defense(mine).unwrap(), 1000);
    }

    #[test]
    fn test_move_card_purges_lingering() {
        use crate::core::ExpiryScope;
        use crate::game::LingeringPayload;

        let mut game = game();
        let p1 = game.players[0].id;
        let def = CardDefinition::monster(1, "Gearbolt Sentinel", 4, 1800, 1200);
        let card = game.add_card_to_zone(&def, p1, Zone::Board).unwrap();
        game.lingering.register(
            card,
            p1,
            LingeringPayload::StatModifier {
                card,
                stat: Stat::Attack,
                amount: 700,
            },
            ExpiryScope::Turn,
            1,
        );
        assert_eq!(game.effective_attack(card).unwrap(), 2500);

        assert_eq!(game.move_card(card, Zone::Hand).unwrap(), Zone::Board);
        assert!(game.lingering.is_empty());
        assert!(game.move_card(card, Zone::Board).is_err());
    }

    #[test]
    fn test_life_loss_to_zero() {
        let mut game = game();
        let p2 = game.players[1].id;
        game.change_life(p2, -9000).unwrap();
        assert_eq!(game.players[1].life, 0);
        assert!(game.is_game_over());
        assert_eq!(game.get_winner(), Some(game.players[0].id));
    }
}
