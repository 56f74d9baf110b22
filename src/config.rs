//! Rules configuration
//!
//! Everything numeric about a duel that a host application may want to tune.
//! Defaults match the standard rules.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_life: i32,
    pub starting_hand: usize,
    /// Monster slots per player
    pub max_board_slots: usize,
    /// Spell/trap slots per player (the field slot is separate)
    pub max_spell_trap_slots: usize,
    /// Upper bound on links resolved by one chain resolution, triggered links included
    pub max_chain_resolutions: usize,
    pub starting_resources: i32,
    /// May the player going first attack on turn 1?
    pub first_turn_attack: bool,
    /// Seed for deck shuffles and random discards
    pub seed: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            starting_life: 8000,
            starting_hand: 5,
            max_board_slots: 5,
            max_spell_trap_slots: 5,
            max_chain_resolutions: 256,
            starting_resources: 0,
            first_turn_attack: false,
            seed: 0,
        }
    }
}

impl RulesConfig {
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    pub fn with_starting_hand(mut self, cards: usize) -> Self {
        self.starting_hand = cards;
        self
    }

    pub fn with_starting_resources(mut self, resources: i32) -> Self {
        self.starting_resources = resources;
        self
    }

    pub fn with_max_chain_resolutions(mut self, limit: usize) -> Self {
        self.max_chain_resolutions = limit;
        self
    }

    pub fn with_first_turn_attack(mut self, allowed: bool) -> Self {
        self.first_turn_attack = allowed;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RulesConfig::default();
        assert_eq!(config.starting_life, 8000);
        assert_eq!(config.max_board_slots, 5);
        assert!(!config.first_turn_attack);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RulesConfig::from_json_str(r#"{"starting_life": 4000, "seed": 7}"#).unwrap();
        assert_eq!(config.starting_life, 4000);
        assert_eq!(config.seed, 7);
        assert_eq!(config.starting_hand, 5);
        assert_eq!(config.max_chain_resolutions, 256);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let err = RulesConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Serialization);
    }

    #[test]
    fn test_builders() {
        let config = RulesConfig::default()
            .with_seed(42)
            .with_first_turn_attack(true)
            .with_max_chain_resolutions(8);
        assert_eq!(config.seed, 42);
        assert!(config.first_turn_attack);
        assert_eq!(config.max_chain_resolutions, 8);
    }
}
