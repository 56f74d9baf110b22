//! JSON card catalog
//!
//! A catalog file is a JSON array of card definitions:
//!
//! ```json
//! [{"id": 1, "name": "Pot of Plenty", "kind": {"spell": "normal"}, "ability": "Draw 2 cards."}]
//! ```

use crate::core::{CardDefinition, CardName};
use crate::parser;
use crate::services::CardCatalog;
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Parse coverage of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityAudit {
    pub id: u32,
    pub name: String,
    pub parsed: usize,
    pub unrecognized: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    cards: FxHashMap<u32, CardDefinition>,
    by_name: FxHashMap<String, u32>,
}

impl JsonCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let definitions: Vec<CardDefinition> = serde_json::from_str(json)?;
        let mut catalog = JsonCatalog::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Add a definition; ids and folded names must be unique
    pub fn insert(&mut self, definition: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&definition.id) {
            return Err(DuelError::Parse(format!("duplicate card id {}", definition.id)));
        }
        let key = CardName::new(definition.name.as_str()).key();
        if self.by_name.contains_key(&key) {
            return Err(DuelError::Parse(format!(
                "duplicate card name {:?}",
                definition.name
            )));
        }
        self.by_name.insert(key, definition.id);
        self.cards.insert(definition.id, definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Definitions ordered by id
    pub fn definitions(&self) -> Vec<&CardDefinition> {
        let mut defs: Vec<_> = self.cards.values().collect();
        defs.sort_by_key(|d| d.id);
        defs
    }

    /// Report which ability clauses the parser understands
    pub fn audit(&self) -> Vec<AbilityAudit> {
        self.definitions()
            .into_iter()
            .map(|def| {
                let ability = parser::parse_multi(&def.ability);
                AbilityAudit {
                    id: def.id,
                    name: def.name.clone(),
                    parsed: ability.effects.len(),
                    unrecognized: ability.unrecognized,
                }
            })
            .collect()
    }
}

impl CardCatalog for JsonCatalog {
    fn get_card(&self, id: u32) -> Option<CardDefinition> {
        self.cards.get(&id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<CardDefinition> {
        let id = self.by_name.get(&CardName::new(name).key())?;
        self.get_card(*id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardKind, SpellKind};

    const CATALOG: &str = r#"[
        {"id": 1, "name": "Pot of Plenty", "kind": {"spell": "normal"}, "ability": "Draw 2 cards."},
        {"id": 2, "name": "Gearbolt Sentinel", "kind": "monster", "level": 4, "attack": 1800, "defense": 1200},
        {"id": 3, "name": "Odd Relic", "kind": "monster", "level": 1, "ability": "This card sings. Draw 1 card."}
    ]"#;

    #[test]
    fn test_load_and_lookup() {
        let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get_card(1).unwrap().kind,
            CardKind::Spell(SpellKind::Normal)
        );
        assert_eq!(catalog.find_by_name("POT OF PLENTY").unwrap().id, 1);
        assert!(catalog.get_card(99).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": 1, "name": "A", "kind": "monster"},
            {"id": 1, "name": "B", "kind": "monster"}
        ]"#;
        let err = JsonCatalog::from_json_str(json).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_audit_lists_unrecognized_clauses() {
        let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
        let audit = catalog.audit();
        assert_eq!(audit[0].parsed, 1);
        assert!(audit[1].unrecognized.is_empty());
        assert_eq!(audit[2].parsed, 1);
        assert_eq!(audit[2].unrecognized, vec!["This card sings"]);
    }
}
