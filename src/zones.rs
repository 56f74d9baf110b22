//! Game zones (Deck, Hand, Board, Graveyard, Banished, Spell/Trap, Field)

use crate::core::{CardId, PlayerId};
use serde::{Deserialize, Serialize};

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    /// Monster slots
    Board,
    Graveyard,
    Banished,
    /// Spell/trap slots
    SpellTrap,
    /// The single field-spell slot
    FieldSlot,
}

impl Zone {
    /// Zones whose cards are "on the field"
    pub fn is_field(&self) -> bool {
        matches!(self, Zone::Board | Zone::SpellTrap | Zone::FieldSlot)
    }
}

/// Battle position of a monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Offense,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Up,
    Down,
}

/// A monster occupying a board slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCard {
    pub card: CardId,
    pub stance: Stance,
    pub face: Face,
    /// Attacked, changed stance or entered this turn by special summon
    pub has_acted: bool,
    pub summoned_turn: u32,
}

impl BoardCard {
    pub fn new(card: CardId, stance: Stance, face: Face, turn: u32) -> Self {
        BoardCard {
            card,
            stance,
            face,
            has_acted: false,
            summoned_turn: turn,
        }
    }

    pub fn is_face_up(&self) -> bool {
        self.face == Face::Up
    }
}

/// A card occupying a spell/trap slot (or the field slot)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellTrapSlot {
    pub card: CardId,
    pub face: Face,
    pub activated: bool,
    /// Turn the card was set; traps may only be activated on a later turn
    pub turn_set: u32,
}

impl SpellTrapSlot {
    pub fn set(card: CardId, turn: u32) -> Self {
        SpellTrapSlot {
            card,
            face: Face::Down,
            activated: false,
            turn_set: turn,
        }
    }

    pub fn face_up(card: CardId, turn: u32) -> Self {
        SpellTrapSlot {
            card,
            face: Face::Up,
            activated: true,
            turn_set: turn,
        }
    }

    pub fn is_face_up(&self) -> bool {
        self.face == Face::Up
    }
}

/// An ordered pile of cards (deck, hand, graveyard, banished)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,

    /// Owner of this zone (each player has their own zones)
    pub owner: PlayerId,

    /// Cards in this zone; the last entry is the top of the deck
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // Order-preserving: hands and graveyards are listed to players in this order
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for Deck)
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn add_to_bottom(&mut self, card_id: CardId) {
        self.cards.insert(0, card_id);
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Collection of all zones for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub deck: CardZone,
    pub hand: CardZone,
    pub graveyard: CardZone,
    pub banished: CardZone,
    pub board: Vec<BoardCard>,
    pub spell_trap: Vec<SpellTrapSlot>,
    pub field: Option<SpellTrapSlot>,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId) -> Self {
        PlayerZones {
            deck: CardZone::new(Zone::Deck, player_id),
            hand: CardZone::new(Zone::Hand, player_id),
            graveyard: CardZone::new(Zone::Graveyard, player_id),
            banished: CardZone::new(Zone::Banished, player_id),
            board: Vec::new(),
            spell_trap: Vec::new(),
            field: None,
        }
    }

    /// Pile zones only; board, spell/trap and field hold slot structs
    pub fn get_zone(&self, zone: Zone) -> Option<&CardZone> {
        match zone {
            Zone::Deck => Some(&self.deck),
            Zone::Hand => Some(&self.hand),
            Zone::Graveyard => Some(&self.graveyard),
            Zone::Banished => Some(&self.banished),
            _ => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> Option<&mut CardZone> {
        match zone {
            Zone::Deck => Some(&mut self.deck),
            Zone::Hand => Some(&mut self.hand),
            Zone::Graveyard => Some(&mut self.graveyard),
            Zone::Banished => Some(&mut self.banished),
            _ => None,
        }
    }

    pub fn board_card(&self, card: CardId) -> Option<&BoardCard> {
        self.board.iter().find(|b| b.card == card)
    }

    pub fn board_card_mut(&mut self, card: CardId) -> Option<&mut BoardCard> {
        self.board.iter_mut().find(|b| b.card == card)
    }

    pub fn spell_trap_slot(&self, card: CardId) -> Option<&SpellTrapSlot> {
        self.spell_trap
            .iter()
            .chain(self.field.iter())
            .find(|s| s.card == card)
    }

    pub fn spell_trap_slot_mut(&mut self, card: CardId) -> Option<&mut SpellTrapSlot> {
        self.spell_trap
            .iter_mut()
            .chain(self.field.iter_mut())
            .find(|s| s.card == card)
    }

    /// Which zone holds `card`, if any of this player's zones do
    pub fn locate(&self, card: CardId) -> Option<Zone> {
        if self.board.iter().any(|b| b.card == card) {
            Some(Zone::Board)
        } else if self.spell_trap.iter().any(|s| s.card == card) {
            Some(Zone::SpellTrap)
        } else if self.field.as_ref().is_some_and(|s| s.card == card) {
            Some(Zone::FieldSlot)
        } else if self.hand.contains(card) {
            Some(Zone::Hand)
        } else if self.graveyard.contains(card) {
            Some(Zone::Graveyard)
        } else if self.banished.contains(card) {
            Some(Zone::Banished)
        } else if self.deck.contains(card) {
            Some(Zone::Deck)
        } else {
            None
        }
    }

    /// Remove `card` from whichever zone holds it, returning that zone
    pub fn remove(&mut self, card: CardId) -> Option<Zone> {
        let zone = self.locate(card)?;
        match zone {
            Zone::Board => self.board.retain(|b| b.card != card),
            Zone::SpellTrap => self.spell_trap.retain(|s| s.card != card),
            Zone::FieldSlot => self.field = None,
            pile => {
                if let Some(z) = self.get_zone_mut(pile) {
                    z.remove(card);
                }
            }
        }
        Some(zone)
    }

    /// Ids of every card in this player's monster and spell/trap slots
    pub fn field_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.board
            .iter()
            .map(|b| b.card)
            .chain(self.spell_trap.iter().map(|s| s.card))
            .chain(self.field.iter().map(|s| s.card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_zone() {
        let player_id = PlayerId::new(1);
        let mut zone = CardZone::new(Zone::Hand, player_id);

        assert!(zone.is_empty());

        let card1 = CardId::new(10);
        let card2 = CardId::new(11);

        zone.add(card1);
        zone.add(card2);

        assert_eq!(zone.len(), 2);
        assert!(zone.contains(card1));

        assert!(zone.remove(card1));
        assert_eq!(zone.len(), 1);
        assert!(!zone.contains(card1));
        assert!(!zone.remove(card1));
    }

    #[test]
    fn test_deck_operations() {
        let mut deck = CardZone::new(Zone::Deck, PlayerId::new(1));

        let card1 = CardId::new(10);
        let card2 = CardId::new(11);

        deck.add(card1); // Bottom
        deck.add(card2); // Top

        assert_eq!(deck.peek_top(), Some(card2));
        assert_eq!(deck.draw_top(), Some(card2));
        assert_eq!(deck.draw_top(), Some(card1));
        assert_eq!(deck.draw_top(), None);
    }

    #[test]
    fn test_locate_and_remove_across_zones() {
        let mut zones = PlayerZones::new(PlayerId::new(0));
        let monster = CardId::new(1);
        let trap = CardId::new(2);
        let field = CardId::new(3);
        let held = CardId::new(4);

        zones.board.push(BoardCard::new(monster, Stance::Offense, Face::Up, 1));
        zones.spell_trap.push(SpellTrapSlot::set(trap, 1));
        zones.field = Some(SpellTrapSlot::face_up(field, 1));
        zones.hand.add(held);

        assert_eq!(zones.locate(monster), Some(Zone::Board));
        assert_eq!(zones.locate(trap), Some(Zone::SpellTrap));
        assert_eq!(zones.locate(field), Some(Zone::FieldSlot));
        assert_eq!(zones.locate(held), Some(Zone::Hand));
        assert_eq!(zones.field_cards().count(), 3);

        assert_eq!(zones.remove(field), Some(Zone::FieldSlot));
        assert!(zones.field.is_none());
        assert_eq!(zones.remove(monster), Some(Zone::Board));
        assert!(zones.board.is_empty());
        assert_eq!(zones.remove(monster), None);
    }
}
