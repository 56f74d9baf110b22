//! Card types and definitions

use crate::core::{Archetype, CardCategory, CardId, CardName, GameEntity, ParsedEffect, PlayerId};
use crate::parser;
use serde::{Deserialize, Serialize};

/// Spell card subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    Normal,
    QuickPlay,
    Continuous,
    Field,
    Equip,
    Ritual,
}

/// Trap card subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    Normal,
    Continuous,
    Counter,
}

/// Card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Monster,
    Spell(SpellKind),
    Trap(TrapKind),
}

impl CardKind {
    pub fn category(&self) -> CardCategory {
        match self {
            CardKind::Monster => CardCategory::Monster,
            CardKind::Spell(_) => CardCategory::Spell,
            CardKind::Trap(_) => CardCategory::Trap,
        }
    }
}

/// Catalog entry a card instance is created from
///
/// This is what the card catalog hands out: name, type, stats and the raw
/// ability text. Ability text is parsed once, in [`CardDefinition::instantiate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: u32,
    pub name: String,
    pub kind: CardKind,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub ability: String,
}

impl CardDefinition {
    pub fn monster(id: u32, name: &str, level: u8, attack: i32, defense: i32) -> Self {
        CardDefinition {
            id,
            name: name.to_string(),
            kind: CardKind::Monster,
            archetype: None,
            level,
            attack,
            defense,
            ability: String::new(),
        }
    }

    pub fn spell(id: u32, name: &str, kind: SpellKind) -> Self {
        CardDefinition {
            id,
            name: name.to_string(),
            kind: CardKind::Spell(kind),
            archetype: None,
            level: 0,
            attack: 0,
            defense: 0,
            ability: String::new(),
        }
    }

    pub fn trap(id: u32, name: &str, kind: TrapKind) -> Self {
        CardDefinition {
            id,
            name: name.to_string(),
            kind: CardKind::Trap(kind),
            archetype: None,
            level: 0,
            attack: 0,
            defense: 0,
            ability: String::new(),
        }
    }

    pub fn with_ability(mut self, ability: &str) -> Self {
        self.ability = ability.to_string();
        self
    }

    pub fn with_archetype(mut self, archetype: &str) -> Self {
        self.archetype = Some(archetype.to_string());
        self
    }

    /// Create a card instance, parsing the ability text
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Card {
        let effects = parser::parse_multi(&self.ability).effects;
        Card {
            id,
            definition_id: self.id,
            name: CardName::new(self.name.as_str()),
            kind: self.kind,
            archetype: self.archetype.as_deref().map(Archetype::new),
            level: self.level,
            attack: self.attack,
            defense: self.defense,
            text: self.ability.clone(),
            effects,
            owner,
        }
    }
}

/// A card instance during gameplay
///
/// Many instances can share one definition; each has its own [`CardId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,

    /// Catalog id this instance was created from
    pub definition_id: u32,

    pub name: CardName,

    pub kind: CardKind,

    pub archetype: Option<Archetype>,

    /// Level (monsters only, 0 otherwise)
    pub level: u8,

    /// Printed ATK
    pub attack: i32,

    /// Printed DEF
    pub defense: i32,

    /// Raw ability text
    pub text: String,

    /// Parsed effects, indexed by effect index
    pub effects: Vec<ParsedEffect>,

    pub owner: PlayerId,
}

impl Card {
    pub fn category(&self) -> CardCategory {
        self.kind.category()
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CardKind::Monster)
    }

    pub fn is_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell(_))
    }

    pub fn is_trap(&self) -> bool {
        matches!(self.kind, CardKind::Trap(_))
    }

    pub fn is_field_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell(SpellKind::Field))
    }

    pub fn is_quick_play(&self) -> bool {
        matches!(self.kind, CardKind::Spell(SpellKind::QuickPlay))
    }

    /// Does this card stay on the field after its activation resolves?
    pub fn stays_on_field(&self) -> bool {
        matches!(
            self.kind,
            CardKind::Spell(SpellKind::Continuous | SpellKind::Field | SpellKind::Equip)
                | CardKind::Trap(TrapKind::Continuous)
        )
    }

    /// Number of tributes a normal summon or set of this monster requires
    pub fn tributes_required(&self) -> usize {
        match self.level {
            0..=4 => 0,
            5 | 6 => 1,
            _ => 2,
        }
    }

    pub fn effect(&self, index: usize) -> Option<&ParsedEffect> {
        self.effects.get(index)
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
