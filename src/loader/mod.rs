//! Card catalog and deck loaders

pub mod catalog;
pub mod deck;
pub mod game_init;

pub use catalog::{AbilityAudit, JsonCatalog};
pub use deck::{CardRef, DeckEntry, DeckList, DeckLoader};
pub use game_init::GameInitializer;
