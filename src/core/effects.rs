//! Card effects and ability descriptors
//!
//! A [`ParsedEffect`] is the normalized form of one ability clause. The parser
//! produces it once per card definition; the chain resolver, cost payer and
//! trigger scanner only ever read it.

use crate::core::{Card, CardId, Cost, PlayerId};
use crate::game::Phase;
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Monster statistic touched by stat modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
}

/// Player actions that lingering effects can forbid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    ActivateSpell,
    ActivateTrap,
    ActivateMonsterEffect,
    NormalSummon,
    SpecialSummon,
    Attack,
}

impl ActionKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ActionKind::ActivateSpell => "activate spell cards",
            ActionKind::ActivateTrap => "activate trap cards",
            ActionKind::ActivateMonsterEffect => "activate monster effects",
            ActionKind::NormalSummon => "normal summon",
            ActionKind::SpecialSummon => "special summon",
            ActionKind::Attack => "declare attacks",
        }
    }
}

/// Protection clauses ("cannot be destroyed by battle", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protection {
    /// Cannot be destroyed by battle
    BattleDestruction,
    /// Cannot be destroyed by card effects
    EffectDestruction,
    /// Cannot be targeted by the opponent's card effects
    Targeting,
}

/// The closed set of effect kinds; every kind has exactly one executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Draw,
    Destroy,
    Damage,
    Heal,
    Search,
    SpecialSummon,
    Negate,
    Banish,
    Mill,
    Discard,
    ModifyStat(Stat),
    /// Move cards to the given zone (return to hand, shuffle into deck)
    ZoneMove(Zone),
    /// Grant a protection until the effect's duration ends (or statically if continuous)
    Protect(Protection),
    /// Forbid an action for the opponent until the effect's duration ends
    Restrict(ActionKind),
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Draw => "draw",
            EffectKind::Destroy => "destroy",
            EffectKind::Damage => "damage",
            EffectKind::Heal => "heal",
            EffectKind::Search => "search",
            EffectKind::SpecialSummon => "special_summon",
            EffectKind::Negate => "negate",
            EffectKind::Banish => "banish",
            EffectKind::Mill => "mill",
            EffectKind::Discard => "discard",
            EffectKind::ModifyStat(_) => "modify_stat",
            EffectKind::ZoneMove(_) => "zone_move",
            EffectKind::Protect(_) => "protect",
            EffectKind::Restrict(_) => "restrict",
        }
    }
}

/// Game occurrences that abilities can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    NormalSummoned,
    SpecialSummoned,
    /// Any summon (normal, flip or special)
    Summoned,
    Flipped,
    Destroyed,
    DestroyedByBattle,
    SentToGraveyard,
    BattleDamage,
    /// A monster was chosen as an attack target
    Attacked,
    AttackDeclared,
    PhaseStart(Phase),
    PhaseEnd(Phase),
    SpellActivated,
    TrapActivated,
    EffectActivated,
    EffectResolved,
}

/// Whose card/action the trigger event must concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerSubject {
    ThisCard,
    YourSide,
    OpponentSide,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerCondition {
    pub event: TriggerEvent,
    pub subject: TriggerSubject,
}

impl TriggerCondition {
    pub fn new(event: TriggerEvent, subject: TriggerSubject) -> Self {
        TriggerCondition { event, subject }
    }
}

/// How an effect gets onto the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Activated by a player decision
    Manual,
    /// Fires (or may only be activated) in reaction to an event
    On(TriggerCondition),
}

/// Activation timing class of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationClass {
    /// Own main phase, own turn, open game state
    Ignition,
    /// Any phase, whenever the player holds priority
    Quick,
    /// Never activated; applies while the card is face-up
    Continuous,
    /// Only enters the chain through the trigger scanner
    TriggerOnly,
}

/// Once-per-turn restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OncePerTurn {
    #[default]
    Unlimited,
    /// Per card instance and effect index
    Soft,
    /// Per card name, across all copies
    Hard,
}

/// Lifetime of a temporary modifier or prohibition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpiryScope {
    /// Cleared when the named phase is exited
    Phase(Phase),
    /// Cleared when the end phase is exited
    Turn,
}

/// Relative side a selector refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Who {
    You,
    Opponent,
    Either,
}

impl Who {
    pub fn includes(&self, controller: PlayerId, player: PlayerId) -> bool {
        match self {
            Who::You => controller == player,
            Who::Opponent => controller != player,
            Who::Either => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Monster,
    Spell,
    Trap,
}

/// Filter on card attributes ("1 Level 4 or lower Dragon Knight monster")
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardFilter {
    pub category: Option<CardCategory>,
    pub archetype: Option<String>,
    pub max_level: Option<u8>,
}

impl CardFilter {
    pub fn any() -> Self {
        CardFilter::default()
    }

    pub fn monsters() -> Self {
        CardFilter {
            category: Some(CardCategory::Monster),
            ..CardFilter::default()
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        if let Some(category) = self.category {
            if card.category() != category {
                return false;
            }
        }
        if let Some(archetype) = &self.archetype {
            match &card.archetype {
                Some(own) if own.matches(archetype) => {}
                _ => return false,
            }
        }
        if let Some(max_level) = self.max_level {
            if !card.is_monster() || card.level > max_level {
                return false;
            }
        }
        true
    }
}

/// What an effect operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSelector {
    /// The card whose ability this is
    ThisCard,
    Player(Who),
    Card { owner: Who, zone: Zone, filter: CardFilter },
    /// A pending chain link (negation)
    ChainLink,
    /// The card that caused the triggering event ("that monster")
    EventCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub selector: TargetSelector,
    pub count: u8,
    /// "up to N": anything from zero to `count`
    pub up_to: bool,
    /// "all": every matching card, no choice
    pub all: bool,
    /// Targets are declared at activation ("target")
    pub declared: bool,
}

impl TargetSpec {
    pub fn new(selector: TargetSelector) -> Self {
        TargetSpec {
            selector,
            count: 1,
            up_to: false,
            all: false,
            declared: false,
        }
    }

    pub fn count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    pub fn up_to(mut self) -> Self {
        self.up_to = true;
        self
    }

    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    pub fn declared(mut self) -> Self {
        self.declared = true;
        self
    }

    /// Minimum number of choices a selection must contain
    pub fn min_choices(&self) -> usize {
        if self.up_to {
            0
        } else {
            self.count as usize
        }
    }
}

/// A concrete target chosen at activation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    Player(PlayerId),
    Card(CardId),
    /// 1-based chain link index
    ChainLink(usize),
}

pub type Targets = SmallVec<[TargetRef; 2]>;

/// Normalized effect descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEffect {
    pub kind: EffectKind,
    pub trigger: Trigger,
    pub activation: ActivationClass,
    pub cost: Option<Cost>,
    pub target: Option<TargetSpec>,
    pub value: Option<i32>,
    pub once_per_turn: OncePerTurn,
    pub continuous: bool,
    pub protection: Option<Protection>,
    pub duration: Option<ExpiryScope>,
    /// Source clause, for logs and audits
    pub text: String,
}

impl ParsedEffect {
    pub fn new(kind: EffectKind) -> Self {
        ParsedEffect {
            kind,
            trigger: Trigger::Manual,
            activation: ActivationClass::Ignition,
            cost: None,
            target: None,
            value: None,
            once_per_turn: OncePerTurn::Unlimited,
            continuous: false,
            protection: None,
            duration: None,
            text: String::new(),
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_trigger(mut self, condition: TriggerCondition) -> Self {
        self.trigger = Trigger::On(condition);
        self
    }

    pub fn with_activation(mut self, activation: ActivationClass) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_once_per_turn(mut self, opt: OncePerTurn) -> Self {
        self.once_per_turn = opt;
        self
    }

    pub fn is_negation(&self) -> bool {
        matches!(self.kind, EffectKind::Negate)
    }

    pub fn is_hard_once_per_turn(&self) -> bool {
        self.once_per_turn == OncePerTurn::Hard
    }

    pub fn trigger_condition(&self) -> Option<TriggerCondition> {
        match self.trigger {
            Trigger::On(condition) => Some(condition),
            Trigger::Manual => None,
        }
    }

    /// Targets must be chosen when the effect is activated
    pub fn needs_declared_targets(&self) -> bool {
        self.target.as_ref().is_some_and(|t| t.declared)
    }

    pub fn amount(&self) -> i32 {
        self.value.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_builder() {
        let effect = ParsedEffect::new(EffectKind::Draw)
            .with_value(2)
            .with_once_per_turn(OncePerTurn::Hard);

        assert_eq!(effect.kind, EffectKind::Draw);
        assert_eq!(effect.amount(), 2);
        assert!(effect.is_hard_once_per_turn());
        assert!(!effect.is_negation());
        assert_eq!(effect.trigger_condition(), None);
    }

    #[test]
    fn test_target_spec_min_choices() {
        let spec = TargetSpec::new(TargetSelector::ChainLink);
        assert_eq!(spec.min_choices(), 1);

        let spec = TargetSpec::new(TargetSelector::Player(Who::Opponent))
            .count(2)
            .up_to();
        assert_eq!(spec.min_choices(), 0);
    }

    #[test]
    fn test_who_includes() {
        let me = PlayerId::new(0);
        let them = PlayerId::new(1);
        assert!(Who::You.includes(me, me));
        assert!(!Who::You.includes(me, them));
        assert!(Who::Opponent.includes(me, them));
        assert!(Who::Either.includes(me, them));
    }
}
