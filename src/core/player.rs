//! Player representation

use crate::core::{GameEntity, PlayerId, PlayerName};
use serde::{Deserialize, Serialize};

/// Represents a player in the duel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique ID for this player
    pub id: PlayerId,

    /// Player name
    pub name: PlayerName,

    /// Life points
    pub life: i32,

    /// Resource pool spent by "pay N mana" costs
    pub resources: i32,

    /// Has the player lost?
    pub has_lost: bool,

    /// Primary (normal) summon performed this turn
    pub normal_summon_used: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_life: i32) -> Self {
        Player {
            id,
            name: name.into(),
            life: starting_life,
            resources: 0,
            has_lost: false,
            normal_summon_used: false,
        }
    }

    pub fn gain_life(&mut self, amount: i32) {
        self.life += amount;
    }

    pub fn lose_life(&mut self, amount: i32) {
        self.life -= amount;
        if self.life <= 0 {
            self.life = 0;
            self.has_lost = true;
        }
    }

    pub fn can_normal_summon(&self) -> bool {
        !self.normal_summon_used
    }

    /// Clear per-turn flags at the start of this player's turn
    pub fn reset_turn_flags(&mut self) {
        self.normal_summon_used = false;
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let id = PlayerId::new(1);
        let player = Player::new(id, "Alice", 8000);

        assert_eq!(player.id, id);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.life, 8000);
        assert!(!player.has_lost);
        assert!(player.can_normal_summon());
    }

    #[test]
    fn test_player_life() {
        let mut player = Player::new(PlayerId::new(1), "Bob", 8000);

        player.lose_life(3000);
        assert_eq!(player.life, 5000);
        assert!(!player.has_lost);

        player.lose_life(6000);
        assert_eq!(player.life, 0);
        assert!(player.has_lost);

        player.gain_life(1000);
        assert_eq!(player.life, 1000);
        // has_lost stays true once triggered
        assert!(player.has_lost);
    }

    #[test]
    fn test_normal_summon_flag() {
        let mut player = Player::new(PlayerId::new(1), "Charlie", 8000);
        player.normal_summon_used = true;
        assert!(!player.can_normal_summon());
        player.reset_turn_flags();
        assert!(player.can_normal_summon());
    }
}
