//! Combat: attack declaration and damage calculation
//!
//! An attack is declared, opens a response window, and waits in
//! [`CombatState`] until the turn player asks for damage calculation. Phase
//! changes are refused while an attack is waiting.

use crate::core::{ActionKind, CardId, PlayerId};
use crate::game::{GameEvent, GameState, Phase};
use crate::zones::{Face, Stance};
use crate::{game_log, DuelError, Result};
use serde::{Deserialize, Serialize};

/// The attack currently waiting for damage calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    pub attacker: CardId,
    pub attacking_player: PlayerId,
    /// `None` for a direct attack
    pub target: Option<CardId>,
    /// The attack target left the field before damage calculation
    pub target_lost: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatState {
    pending: Option<PendingAttack>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, attacker: CardId, attacking_player: PlayerId, target: Option<CardId>) {
        self.pending = Some(PendingAttack {
            attacker,
            attacking_player,
            target,
            target_lost: false,
        });
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingAttack> {
        self.pending.as_ref()
    }

    pub fn is_attacking(&self, card: CardId) -> bool {
        self.pending.is_some_and(|a| a.attacker == card)
    }

    /// A card left the field: an attacker's attack ends, a target is marked lost
    pub fn forget(&mut self, card: CardId) {
        let Some(attack) = self.pending.as_mut() else {
            return;
        };
        if attack.attacker == card {
            self.pending = None;
        } else if attack.target == Some(card) {
            attack.target_lost = true;
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// What damage calculation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleOutcome {
    /// (player who lost life, amount)
    pub damage: Vec<(PlayerId, i32)>,
    pub destroyed: Vec<CardId>,
}

impl GameState {
    /// Declare an attack with `attacker`; `target = None` attacks directly
    pub fn declare_attack(
        &mut self,
        actor: PlayerId,
        attacker: CardId,
        target: Option<CardId>,
    ) -> Result<()> {
        if !self.turn.is_turn_player(actor) {
            return Err(DuelError::NotYourTurn(format!(
                "player {actor} cannot attack on player {}'s turn",
                self.turn.active_player
            )));
        }
        if self.turn.current_phase != Phase::Battle {
            return Err(DuelError::InvalidPhase(format!(
                "attacks are declared in the battle phase, not {}",
                self.turn.current_phase
            )));
        }
        if !self.chain.is_empty() || self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(
                "cannot attack while a chain is open".to_string(),
            ));
        }
        if self.combat.is_active() {
            return Err(DuelError::InvalidMove(
                "the previous attack has not been resolved".to_string(),
            ));
        }
        if self.turn.turn_number == 1 && !self.config.first_turn_attack {
            return Err(DuelError::InvalidMove(
                "the first player cannot attack on the first turn".to_string(),
            ));
        }
        let prevention = self.lingering.is_action_prevented(ActionKind::Attack, actor);
        if prevention.prevented {
            return Err(DuelError::InvalidMove(prevention.reason.unwrap_or_default()));
        }

        let slot = self
            .zones(actor)?
            .board_card(attacker)
            .ok_or_else(|| DuelError::CardNotInExpectedZone {
                card: attacker.as_u32(),
                reason: "attackers must be on your side of the board".to_string(),
            })?;
        if !slot.is_face_up() || slot.stance != Stance::Offense {
            return Err(DuelError::InvalidMove(format!(
                "card {attacker} must be face-up in offense stance to attack"
            )));
        }
        if slot.has_acted {
            return Err(DuelError::InvalidMove(format!(
                "card {attacker} has already acted this turn"
            )));
        }

        let defender = self.opponent_of(actor);
        let defenders = self.cards_in_zone(defender, crate::zones::Zone::Board);
        match target {
            Some(t) if !defenders.contains(&t) => {
                return Err(DuelError::InvalidTarget(format!(
                    "card {t} is not a monster your opponent controls"
                )))
            }
            None if !defenders.is_empty() => {
                return Err(DuelError::InvalidMove(
                    "cannot attack directly while your opponent controls a monster".to_string(),
                ))
            }
            _ => {}
        }

        if let Some(slot) = self.zones_mut(actor)?.board_card_mut(attacker) {
            slot.has_acted = true;
        }
        self.combat.declare(attacker, actor, target);
        self.events.open_window();
        self.record(GameEvent::AttackDeclared {
            player: actor,
            attacker,
            target,
        });
        match target {
            Some(t) => game_log!(self, Normal, "combat", "card {} attacks card {}", attacker, t),
            None => game_log!(self, Normal, "combat", "card {} attacks directly", attacker),
        }
        self.scan_new_events()?;
        Ok(())
    }

    /// Damage calculation for the waiting attack
    pub fn resolve_battle(&mut self, actor: PlayerId) -> Result<BattleOutcome> {
        if !self.turn.is_turn_player(actor) {
            return Err(DuelError::NotYourTurn(
                "only the attacking player runs damage calculation".to_string(),
            ));
        }
        if !self.chain.is_empty() || self.pending_selection.is_some() {
            return Err(DuelError::InvalidMove(
                "responses to the attack must resolve first".to_string(),
            ));
        }
        let attack = *self
            .combat
            .pending()
            .ok_or_else(|| DuelError::InvalidMove("no attack is waiting".to_string()))?;
        self.combat.clear();

        let mut outcome = BattleOutcome::default();
        if attack.target_lost || self.board_card(attack.attacker).is_none() {
            game_log!(self, Normal, "combat", "attack by card {} ends without damage", attack.attacker);
            self.scan_new_events()?;
            return Ok(outcome);
        }

        let attacker_power = self.effective_attack(attack.attacker)?;
        let defender = self.opponent_of(attack.attacking_player);

        match attack.target {
            None => {
                self.battle_damage(&mut outcome, attack.attacker, attack.attacking_player, defender, attacker_power)?;
            }
            Some(target) => {
                let (face, stance) = match self.board_card(target) {
                    Some(slot) => (slot.face, slot.stance),
                    None => {
                        self.scan_new_events()?;
                        return Ok(outcome);
                    }
                };
                if face == Face::Down {
                    if let Some(slot) = self.zones_mut(defender)?.board_card_mut(target) {
                        slot.face = Face::Up;
                    }
                    self.record(GameEvent::Flipped {
                        player: defender,
                        card: target,
                    });
                }

                match stance {
                    Stance::Offense => {
                        let target_power = self.effective_attack(target)?;
                        if attacker_power > target_power {
                            self.battle_destroy(&mut outcome, target)?;
                            self.battle_damage(&mut outcome, attack.attacker, attack.attacking_player, defender, attacker_power - target_power)?;
                        } else if attacker_power < target_power {
                            self.battle_destroy(&mut outcome, attack.attacker)?;
                            self.battle_damage(&mut outcome, target, defender, attack.attacking_player, target_power - attacker_power)?;
                        } else if attacker_power > 0 {
                            self.battle_destroy(&mut outcome, target)?;
                            self.battle_destroy(&mut outcome, attack.attacker)?;
                        }
                    }
                    Stance::Defense => {
                        let guard = self.effective_defense(target)?;
                        if attacker_power > guard {
                            self.battle_destroy(&mut outcome, target)?;
                        } else if attacker_power < guard {
                            self.battle_damage(&mut outcome, target, defender, attack.attacking_player, guard - attacker_power)?;
                        }
                    }
                }
            }
        }

        self.scan_new_events()?;
        Ok(outcome)
    }

    fn battle_destroy(&mut self, outcome: &mut BattleOutcome, card: CardId) -> Result<()> {
        if self.board_card(card).is_some() && self.destroy_card(card, true)? {
            outcome.destroyed.push(card);
        }
        Ok(())
    }

    /// `source`, controlled by `dealer`, inflicts `amount` battle damage on `victim`
    fn battle_damage(
        &mut self,
        outcome: &mut BattleOutcome,
        source: CardId,
        dealer: PlayerId,
        victim: PlayerId,
        amount: i32,
    ) -> Result<()> {
        if amount <= 0 {
            return Ok(());
        }
        self.change_life(victim, -amount)?;
        self.record(GameEvent::BattleDamage {
            player: dealer,
            source,
            amount,
        });
        game_log!(self, Normal, "combat", "player {} takes {} battle damage", victim, amount);
        outcome.damage.push((victim, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::core::CardDefinition;
    use crate::zones::Zone;

    fn battle_ready() -> (GameState, PlayerId, PlayerId) {
        let config = RulesConfig::default().with_first_turn_attack(true);
        let mut game = GameState::new_two_player("Alice", "Bob", config);
        game.logger.enable_capture();
        game.turn.current_phase = Phase::Battle;
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        (game, p1, p2)
    }

    fn monster(game: &mut GameState, owner: PlayerId, atk: i32, def: i32) -> CardId {
        let def = CardDefinition::monster(1, "Soldier", 4, atk, def);
        game.add_card_to_zone(&def, owner, Zone::Board).unwrap()
    }

    #[test]
    fn test_combat_state_forget() {
        let mut combat = CombatState::new();
        combat.declare(CardId::new(1), PlayerId::new(0), Some(CardId::new(2)));
        assert!(combat.is_attacking(CardId::new(1)));
        combat.forget(CardId::new(2));
        assert!(combat.pending().unwrap().target_lost);
        combat.forget(CardId::new(1));
        assert!(!combat.is_active());
    }

    #[test]
    fn test_direct_attack() {
        let (mut game, p1, p2) = battle_ready();
        let attacker = monster(&mut game, p1, 1800, 1000);

        game.declare_attack(p1, attacker, None).unwrap();
        assert!(game.combat.is_active());
        assert!(game.board_card(attacker).unwrap().has_acted);

        let outcome = game.resolve_battle(p1).unwrap();
        assert_eq!(outcome.damage, vec![(p2, 1800)]);
        assert_eq!(game.player(p2).unwrap().life, 6200);
        assert!(!game.combat.is_active());

        // Once per turn per monster
        assert!(game.declare_attack(p1, attacker, None).is_err());
    }

    #[test]
    fn test_stronger_defender_reflects_damage() {
        let (mut game, p1, p2) = battle_ready();
        let attacker = monster(&mut game, p1, 1500, 1000);
        let defender = monster(&mut game, p2, 2000, 500);

        game.declare_attack(p1, attacker, Some(defender)).unwrap();
        let outcome = game.resolve_battle(p1).unwrap();
        assert_eq!(outcome.destroyed, vec![attacker]);
        assert_eq!(outcome.damage, vec![(p1, 500)]);
        assert_eq!(game.zone_of(attacker), Some(Zone::Graveyard));
        assert_eq!(game.zone_of(defender), Some(Zone::Board));
    }

    #[test]
    fn test_face_down_defense_is_flipped() {
        let (mut game, p1, p2) = battle_ready();
        let attacker = monster(&mut game, p1, 1500, 1000);
        let wall = monster(&mut game, p2, 0, 1200);
        {
            let slot = game.zones_mut(p2).unwrap().board_card_mut(wall).unwrap();
            slot.face = Face::Down;
            slot.stance = Stance::Defense;
        }

        game.declare_attack(p1, attacker, Some(wall)).unwrap();
        let outcome = game.resolve_battle(p1).unwrap();
        assert_eq!(outcome.destroyed, vec![wall]);
        assert!(outcome.damage.is_empty());
        assert!(game
            .events
            .records()
            .iter()
            .any(|r| matches!(r.event, GameEvent::Flipped { card, .. } if card == wall)));
    }

    #[test]
    fn test_first_turn_and_direct_attack_rules() {
        let mut game = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
        game.logger.enable_capture();
        game.turn.current_phase = Phase::Battle;
        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        let attacker = monster(&mut game, p1, 1500, 1000);
        assert!(game.declare_attack(p1, attacker, None).is_err());

        game.config.first_turn_attack = true;
        monster(&mut game, p2, 100, 100);
        let err = game.declare_attack(p1, attacker, None).unwrap_err();
        assert!(err.to_string().contains("directly"));
    }

    #[test]
    fn test_battle_protection() {
        let (mut game, p1, p2) = battle_ready();
        let attacker = monster(&mut game, p1, 3000, 1000);
        let wall_def = CardDefinition::monster(2, "Bastion Golem", 4, 1000, 2000)
            .with_ability("This card cannot be destroyed by battle.");
        let wall = game.add_card_to_zone(&wall_def, p2, Zone::Board).unwrap();

        game.declare_attack(p1, attacker, Some(wall)).unwrap();
        let outcome = game.resolve_battle(p1).unwrap();
        assert!(outcome.destroyed.is_empty());
        assert_eq!(outcome.damage, vec![(p2, 2000)]);
        assert_eq!(game.zone_of(wall), Some(Zone::Board));
    }

    #[test]
    fn test_phase_change_blocked_by_waiting_attack() {
        let (mut game, p1, _) = battle_ready();
        let attacker = monster(&mut game, p1, 1000, 1000);
        game.declare_attack(p1, attacker, None).unwrap();
        let err = game.advance_phase(p1).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CannotAdvance);
    }
}
