//! duel-engine - rules engine for a turn-based trading-card duel
//!
//! The engine owns turn and phase progression, activation legality, cost
//! payment, once-per-turn limits and the effect chain. Hosts drive it with
//! [`game::Command`]s against immutable [`game::GameState`] snapshots.

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod game;
pub mod loader;
pub mod parser;
pub mod services;
pub mod zones;

pub use error::{DuelError, Result};
