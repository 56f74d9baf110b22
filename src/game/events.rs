//! Domain events
//!
//! Every state change the outside world may care about is recorded as a
//! [`GameEvent`]. Records carry a sequence number so the trigger scanner can
//! process each one exactly once, and the log is drained into each
//! [`Transition`](crate::game::Transition) for the host's event sink.

use crate::core::{CardCategory, CardId, PlayerId, TriggerEvent};
use crate::game::Phase;
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged {
        player: PlayerId,
        from: Phase,
        to: Phase,
    },
    TurnStarted {
        player: PlayerId,
        turn: u32,
    },
    CardDrawn {
        player: PlayerId,
        card: CardId,
    },
    NormalSummoned {
        player: PlayerId,
        card: CardId,
    },
    MonsterSet {
        player: PlayerId,
        card: CardId,
    },
    FlipSummoned {
        player: PlayerId,
        card: CardId,
    },
    /// Turned face-up by an attack
    Flipped {
        player: PlayerId,
        card: CardId,
    },
    SpecialSummoned {
        player: PlayerId,
        card: CardId,
    },
    CardSet {
        player: PlayerId,
        card: CardId,
    },
    CardActivated {
        player: PlayerId,
        card: CardId,
        effect_index: usize,
        category: CardCategory,
        chain_index: usize,
    },
    FieldSpellPlaced {
        player: PlayerId,
        card: CardId,
        replaced: Option<CardId>,
    },
    CostPaid {
        player: PlayerId,
        card: CardId,
        description: String,
    },
    ChainLinkNegated {
        chain_index: usize,
        card: CardId,
    },
    EffectResolved {
        player: PlayerId,
        card: CardId,
        effect_index: usize,
        message: String,
    },
    EffectFizzled {
        player: PlayerId,
        card: CardId,
        effect_index: usize,
        message: String,
    },
    ChainResolved {
        links: usize,
    },
    CardDestroyed {
        owner: PlayerId,
        card: CardId,
        by_battle: bool,
    },
    SentToGraveyard {
        owner: PlayerId,
        card: CardId,
        from: Zone,
    },
    CardMoved {
        owner: PlayerId,
        card: CardId,
        from: Zone,
        to: Zone,
    },
    Discarded {
        player: PlayerId,
        card: CardId,
    },
    LifeChanged {
        player: PlayerId,
        delta: i32,
        life: i32,
    },
    AttackDeclared {
        player: PlayerId,
        attacker: CardId,
        target: Option<CardId>,
    },
    BattleDamage {
        /// Controller of the monster that dealt the damage
        player: PlayerId,
        source: CardId,
        amount: i32,
    },
    LingeringRegistered {
        id: u32,
        source: CardId,
    },
    LingeringExpired {
        id: u32,
        source: CardId,
    },
    PlayerLost {
        player: PlayerId,
    },
}

/// One side of an event as seen by a trigger condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch {
    pub event: TriggerEvent,
    /// Card the event happened to, if any
    pub card: Option<CardId>,
    /// Player the event belongs to (summoner, activator, attacker, turn player)
    pub player: PlayerId,
}

impl GameEvent {
    /// Event kind as reported to the host's event sink
    pub fn kind_name(&self) -> &'static str {
        match self {
            GameEvent::PhaseChanged { .. } => "phase_changed",
            GameEvent::TurnStarted { .. } => "turn_started",
            GameEvent::CardDrawn { .. } => "on_draw",
            GameEvent::NormalSummoned { .. }
            | GameEvent::FlipSummoned { .. }
            | GameEvent::SpecialSummoned { .. } => "on_summon",
            GameEvent::MonsterSet { .. } | GameEvent::CardSet { .. } => "on_set",
            GameEvent::Flipped { .. } => "on_flip",
            GameEvent::CardActivated { category, .. } => match category {
                CardCategory::Spell => "on_spell_activated",
                CardCategory::Trap => "on_trap_activated",
                CardCategory::Monster => "on_effect_activated",
            },
            GameEvent::FieldSpellPlaced { .. } => "on_field_spell",
            GameEvent::CostPaid { .. } => "cost_paid",
            GameEvent::ChainLinkNegated { .. } => "on_negate",
            GameEvent::EffectResolved { .. } => "on_effect_resolved",
            GameEvent::EffectFizzled { .. } => "on_effect_fizzled",
            GameEvent::ChainResolved { .. } => "chain_resolved",
            GameEvent::CardDestroyed { .. } => "on_destroy",
            GameEvent::SentToGraveyard { .. } => "on_sent_to_graveyard",
            GameEvent::CardMoved { .. } => "card_moved",
            GameEvent::Discarded { .. } => "on_discard",
            GameEvent::LifeChanged { .. } => "life_changed",
            GameEvent::AttackDeclared { .. } => "on_attack",
            GameEvent::BattleDamage { .. } => "on_battle_damage",
            GameEvent::LingeringRegistered { .. } => "lingering_registered",
            GameEvent::LingeringExpired { .. } => "lingering_expired",
            GameEvent::PlayerLost { .. } => "player_lost",
        }
    }

    /// The trigger events this occurrence satisfies
    ///
    /// `defender` resolves the "attacked" side of an attack declaration.
    pub fn trigger_matches(&self, defender: PlayerId) -> SmallVec<[TriggerMatch; 2]> {
        let m = |event, card, player| TriggerMatch {
            event,
            card,
            player,
        };
        match *self {
            GameEvent::PhaseChanged { player, from, to } => smallvec![
                m(TriggerEvent::PhaseEnd(from), None, player),
                m(TriggerEvent::PhaseStart(to), None, player),
            ],
            GameEvent::NormalSummoned { player, card } => smallvec![
                m(TriggerEvent::NormalSummoned, Some(card), player),
                m(TriggerEvent::Summoned, Some(card), player),
            ],
            GameEvent::SpecialSummoned { player, card } => smallvec![
                m(TriggerEvent::SpecialSummoned, Some(card), player),
                m(TriggerEvent::Summoned, Some(card), player),
            ],
            GameEvent::FlipSummoned { player, card } => smallvec![
                m(TriggerEvent::Flipped, Some(card), player),
                m(TriggerEvent::Summoned, Some(card), player),
            ],
            GameEvent::Flipped { player, card } => {
                smallvec![m(TriggerEvent::Flipped, Some(card), player)]
            }
            GameEvent::CardActivated {
                player,
                card,
                category,
                ..
            } => match category {
                CardCategory::Spell => smallvec![
                    m(TriggerEvent::SpellActivated, Some(card), player),
                    m(TriggerEvent::EffectActivated, Some(card), player),
                ],
                CardCategory::Trap => smallvec![
                    m(TriggerEvent::TrapActivated, Some(card), player),
                    m(TriggerEvent::EffectActivated, Some(card), player),
                ],
                CardCategory::Monster => {
                    smallvec![m(TriggerEvent::EffectActivated, Some(card), player)]
                }
            },
            GameEvent::EffectResolved { player, card, .. } => {
                smallvec![m(TriggerEvent::EffectResolved, Some(card), player)]
            }
            GameEvent::CardDestroyed {
                owner,
                card,
                by_battle,
            } => {
                let mut out = smallvec![m(TriggerEvent::Destroyed, Some(card), owner)];
                if by_battle {
                    out.push(m(TriggerEvent::DestroyedByBattle, Some(card), owner));
                }
                out
            }
            GameEvent::SentToGraveyard { owner, card, .. } => {
                smallvec![m(TriggerEvent::SentToGraveyard, Some(card), owner)]
            }
            GameEvent::AttackDeclared {
                player,
                attacker,
                target,
            } => {
                let mut out = smallvec![m(TriggerEvent::AttackDeclared, Some(attacker), player)];
                if let Some(target) = target {
                    out.push(m(TriggerEvent::Attacked, Some(target), defender));
                }
                out
            }
            GameEvent::BattleDamage { player, source, .. } => {
                smallvec![m(TriggerEvent::BattleDamage, Some(source), player)]
            }
            _ => SmallVec::new(),
        }
    }
}

/// A recorded event with its position in the duel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub turn: u32,
    pub phase: Phase,
    pub event: GameEvent,
}

/// Append-only event log with a trigger-scan watermark
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    /// Records not yet handed to the host
    records: Vec<EventRecord>,
    /// Events since the last new game action; manual activations respond to these
    window: Vec<EventRecord>,
    next_seq: u64,
    /// Every record with `seq < scanned_through` has been trigger-scanned
    scanned_through: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, turn: u32, phase: Phase, event: GameEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let record = EventRecord {
            seq,
            turn,
            phase,
            event,
        };
        self.window.push(record.clone());
        self.records.push(record);
        seq
    }

    /// Start a fresh response window; records not yet scanned are kept
    pub fn open_window(&mut self) {
        let scanned = self.scanned_through;
        self.window.retain(|r| r.seq >= scanned);
    }

    pub fn window(&self) -> &[EventRecord] {
        &self.window
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Hand all undelivered records to the caller
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Records not yet trigger-scanned; advances the watermark
    pub fn take_unscanned(&mut self) -> Vec<EventRecord> {
        let from = self.scanned_through;
        self.scanned_through = self.next_seq;
        self.window
            .iter()
            .filter(|r| r.seq >= from)
            .cloned()
            .collect()
    }

    pub fn has_unscanned(&self) -> bool {
        self.scanned_through < self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let p = PlayerId::new(0);
        let c = CardId::new(5);
        assert_eq!(
            GameEvent::NormalSummoned { player: p, card: c }.kind_name(),
            "on_summon"
        );
        let activated = GameEvent::CardActivated {
            player: p,
            card: c,
            effect_index: 0,
            category: CardCategory::Trap,
            chain_index: 1,
        };
        assert_eq!(activated.kind_name(), "on_trap_activated");
        assert_eq!(
            GameEvent::BattleDamage {
                player: p,
                source: c,
                amount: 100
            }
            .kind_name(),
            "on_battle_damage"
        );
    }

    #[test]
    fn test_each_event_scanned_once() {
        let mut log = EventLog::new();
        log.record(1, Phase::Main1, GameEvent::TurnStarted { player: PlayerId::new(0), turn: 1 });
        log.record(1, Phase::Main1, GameEvent::ChainResolved { links: 0 });

        assert!(log.has_unscanned());
        assert_eq!(log.take_unscanned().len(), 2);
        assert!(!log.has_unscanned());
        assert!(log.take_unscanned().is_empty());

        log.record(1, Phase::Main1, GameEvent::ChainResolved { links: 1 });
        let fresh = log.take_unscanned();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].seq, 2);
    }

    #[test]
    fn test_drain_keeps_sequence() {
        let mut log = EventLog::new();
        log.record(1, Phase::Draw, GameEvent::ChainResolved { links: 0 });
        assert_eq!(log.drain().len(), 1);
        assert!(log.records().is_empty());
        let seq = log.record(1, Phase::Draw, GameEvent::ChainResolved { links: 0 });
        assert_eq!(seq, 1);
    }

    #[test]
    fn test_attack_declaration_matches_both_sides() {
        let attacker_owner = PlayerId::new(0);
        let defender = PlayerId::new(1);
        let event = GameEvent::AttackDeclared {
            player: attacker_owner,
            attacker: CardId::new(3),
            target: Some(CardId::new(4)),
        };
        let matches = event.trigger_matches(defender);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].event, TriggerEvent::Attacked);
        assert_eq!(matches[1].player, defender);
    }
}
