//! Core game types and entities

pub mod card;
pub mod costs;
pub mod effects;
pub mod entity;
pub mod player;
pub mod types;

pub use card::{Card, CardDefinition, CardKind, SpellKind, TrapKind};
pub use costs::Cost;
pub use effects::{
    ActionKind, ActivationClass, CardCategory, CardFilter, EffectKind, ExpiryScope, OncePerTurn,
    ParsedEffect, Protection, Stat, TargetRef, TargetSelector, TargetSpec, Targets, Trigger,
    TriggerCondition, TriggerEvent, TriggerSubject, Who,
};
pub use entity::{EntityId, EntityStore, GameEntity};
pub use player::Player;
pub use types::{Archetype, CardName, PlayerName};

pub type CardId = EntityId<Card>;
pub type PlayerId = EntityId<Player>;
