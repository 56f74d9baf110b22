//! Strongly-typed wrappers for game concepts
//!
//! This module provides newtypes to prevent type confusion and make the code
//! more self-documenting. Instead of using bare Strings for different concepts,
//! we wrap them in distinct types that cannot be mixed up.

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fold a display string to the key used for rules comparisons
///
/// "Pot of Plenty", "POT OF PLENTY" and "Pót of Plenty" all fold to "potofplenty".
fn fold_key(s: &str) -> String {
    deunicode(s)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Card name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalized key used for hard once-per-turn bookkeeping and name references
    pub fn key(&self) -> String {
        fold_key(&self.0)
    }

    /// Does this name refer to the same card as `other`, ignoring case, accents and punctuation?
    pub fn same_card(&self, other: &str) -> bool {
        self.key() == fold_key(other)
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

/// Archetype (card family such as "Dragon Knight")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archetype(String);

impl Archetype {
    pub fn new(s: impl Into<String>) -> Self {
        Archetype(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &str) -> bool {
        fold_key(&self.0) == fold_key(other)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Archetype {
    fn from(s: &str) -> Self {
        Archetype(s.to_string())
    }
}

/// Player name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_name_key_folds_case_accents_and_punctuation() {
        let name = CardName::new("Pót of Plenty!");
        assert_eq!(name.key(), "potofplenty");
        assert!(name.same_card("POT OF PLENTY"));
        assert!(!name.same_card("Pot of Greed"));
    }

    #[test]
    fn test_archetype_match() {
        let archetype = Archetype::new("Dragon Knight");
        assert!(archetype.matches("dragon knight"));
        assert!(archetype.matches("Dragon-Knight"));
        assert!(!archetype.matches("Dragon"));
    }

    #[test]
    fn test_player_name() {
        let name = PlayerName::new("Alice");
        assert_eq!(name.as_str(), "Alice");
        assert_eq!(name.to_string(), "Alice");
    }
}
