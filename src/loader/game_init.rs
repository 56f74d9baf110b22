//! Game initialization from decks
//!
//! Creates games from deck lists and a card catalog

use crate::config::RulesConfig;
use crate::core::PlayerId;
use crate::game::GameState;
use crate::loader::DeckList;
use crate::services::CardCatalog;
use crate::{game_log, Result};

/// Game builder for initializing games from decks
pub struct GameInitializer<'a> {
    catalog: &'a dyn CardCatalog,
    config: RulesConfig,
}

impl<'a> GameInitializer<'a> {
    pub fn new(catalog: &'a dyn CardCatalog, config: RulesConfig) -> Self {
        GameInitializer { catalog, config }
    }

    /// Build a two-player duel: decks shuffled with the configured seed, opening hands drawn
    ///
    /// The first player starts in their draw phase and does not draw on turn 1.
    pub fn init_game(
        &self,
        player1_name: &str,
        player1_deck: &DeckList,
        player2_name: &str,
        player2_deck: &DeckList,
    ) -> Result<GameState> {
        let mut game = GameState::new_two_player(player1_name, player2_name, self.config.clone());
        let player1_id = game.players[0].id;
        let player2_id = game.players[1].id;

        self.load_deck_into_game(&mut game, player1_id, player1_deck)?;
        self.load_deck_into_game(&mut game, player2_id, player2_deck)?;

        for (_, zones) in game.player_zones.iter_mut() {
            zones.deck.shuffle(&mut game.rng);
        }
        for player in [player1_id, player2_id] {
            for _ in 0..self.config.starting_hand {
                game.draw(player)?;
            }
        }
        game.scan_new_events()?;

        game_log!(game, Normal, "setup", "{} ({} cards) vs {} ({} cards)", player1_name, player1_deck.total_cards(), player2_name, player2_deck.total_cards());
        Ok(game)
    }

    fn load_deck_into_game(
        &self,
        game: &mut GameState,
        player_id: PlayerId,
        deck: &DeckList,
    ) -> Result<()> {
        for definition in deck.resolve(self.catalog)? {
            game.add_card_to_zone(&definition, player_id, crate::zones::Zone::Deck)?;
        }
        Ok(())
    }
}
