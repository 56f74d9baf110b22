//! Deck list loader
//!
//! One entry per line, `count name` or `count #id`:
//!
//! ```text
//! # Dragon Knights
//! 3 Gearbolt Sentinel
//! 2 #14
//! ```

use crate::core::CardDefinition;
use crate::services::CardCatalog;
use crate::{DuelError, Result};
use std::fs;
use std::path::Path;

/// How an entry names its card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRef {
    Id(u32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card: CardRef,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeckList {
    pub main_deck: Vec<DeckEntry>,
}

impl DeckList {
    pub fn total_cards(&self) -> usize {
        self.main_deck.iter().map(|e| e.count as usize).sum()
    }

    /// Look every entry up in `catalog`, expanding counts
    pub fn resolve(&self, catalog: &dyn CardCatalog) -> Result<Vec<CardDefinition>> {
        let mut out = Vec::with_capacity(self.total_cards());
        for entry in &self.main_deck {
            let definition = match &entry.card {
                CardRef::Id(id) => catalog.get_card(*id),
                CardRef::Name(name) => catalog.find_by_name(name),
            }
            .ok_or_else(|| DuelError::Parse(format!("card not in catalog: {:?}", entry.card)))?;
            for _ in 0..entry.count {
                out.push(definition.clone());
            }
        }
        Ok(out)
    }
}

pub struct DeckLoader;

impl DeckLoader {
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<DeckList> {
        let mut main_deck = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            // Entries start with a count, so a leading '#' is always a comment
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (count_str, rest) = line.split_once(' ').ok_or_else(|| {
                DuelError::Parse(format!("line {}: expected `count card`", line_no + 1))
            })?;
            let count: u8 = count_str.parse().map_err(|_| {
                DuelError::Parse(format!("line {}: bad count {count_str:?}", line_no + 1))
            })?;
            let rest = rest.trim();
            let card = match rest.strip_prefix('#') {
                Some(id) => CardRef::Id(id.parse().map_err(|_| {
                    DuelError::Parse(format!("line {}: bad card id {rest:?}", line_no + 1))
                })?),
                None => CardRef::Name(rest.to_string()),
            };
            main_deck.push(DeckEntry { card, count });
        }

        if main_deck.is_empty() {
            return Err(DuelError::Parse("empty deck".to_string()));
        }
        Ok(DeckList { main_deck })
    }
}
