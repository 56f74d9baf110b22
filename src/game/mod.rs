//! Game state, turn structure and the chain

pub mod actions;
pub mod chain;
pub mod combat;
pub mod commands;
pub mod cost_payment;
pub mod events;
pub mod executors;
pub mod lingering;
pub mod logger;
pub mod once_per_turn;
pub mod phase;
pub mod state;
pub mod triggers;

pub use actions::{ActivationOutcome, ActivationRequest};
pub use chain::{
    spell_speed, Chain, ChainLink, ChainOutcome, ChainState, LinkAdded, PassOutcome,
    PendingSelection, SelectionRequest, SpellSpeed,
};
pub use combat::{BattleOutcome, CombatState, PendingAttack};
pub use commands::{apply, Command, CommandOutcome, Transition};
pub use cost_payment::{CostCheck, CostPayment};
pub use events::{EventLog, EventRecord, GameEvent, TriggerMatch};
pub use executors::ExecutionOutcome;
pub use lingering::{LingeringEffectRecord, LingeringPayload, LingeringRegistry, PreventionCheck};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use once_per_turn::{ActivationCheck, ActiveEffectRecord, OptKey, OptTracker};
pub use phase::{Phase, TurnStructure};
pub use state::GameState;
