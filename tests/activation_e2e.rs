//! End-to-end tests for activation gates: once-per-turn limits, costs and
//! tribute summons

use duel_engine::config::RulesConfig;
use duel_engine::core::{CardDefinition, PlayerId, SpellKind};
use duel_engine::error::ErrorKind;
use duel_engine::game::{ActivationOutcome, ActivationRequest, GameState, Phase};
use duel_engine::zones::Zone;

fn main_phase() -> (GameState, PlayerId, PlayerId) {
    let mut game = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
    game.turn.current_phase = Phase::Main1;
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let filler = CardDefinition::monster(99, "Filler", 1, 0, 0);
    for player in [p1, p2] {
        for _ in 0..6 {
            game.add_card_to_zone(&filler, player, Zone::Deck).unwrap();
        }
    }
    (game, p1, p2)
}

fn cinder_scout() -> CardDefinition {
    CardDefinition::monster(6, "Cinder Scout", 2, 800, 600)
        .with_ability("(Quick Effect) (Hard once per turn): Inflict 500 damage to your opponent.")
}

/// Pass priority back and forth until the chain resolves
fn settle(game: &mut GameState) {
    while !game.chain.is_empty() {
        let holder = game.turn.priority_player;
        game.pass_priority(holder).unwrap();
    }
}

#[test]
fn test_once_per_turn_exhausts_and_resets_next_turn() {
    let (mut game, p1, p2) = main_phase();
    let scout = game.add_card_to_zone(&cinder_scout(), p1, Zone::Board).unwrap();

    game.activate(p1, scout, 0, ActivationRequest::default()).unwrap();
    settle(&mut game);
    assert_eq!(game.player(p2).unwrap().life, 7500);

    let err = game
        .activate(p1, scout, 0, ActivationRequest::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OncePerTurnExhausted);
    assert!(!game.can_activate_effect(scout, 0, p1).unwrap().can_activate);

    game.turn.current_phase = Phase::End;
    game.pass_turn(p1).unwrap();
    assert_eq!(game.turn.active_player, p2);

    // Quick effect on the opponent's turn, once again available
    assert!(game.can_activate_effect(scout, 0, p1).unwrap().can_activate);
    game.activate(p1, scout, 0, ActivationRequest::default()).unwrap();
    settle(&mut game);
    assert_eq!(game.player(p2).unwrap().life, 7000);
}

#[test]
fn test_hard_once_per_turn_covers_every_copy() {
    let (mut game, p1, _) = main_phase();
    let pot = CardDefinition::spell(20, "Pot of Plenty", SpellKind::Normal).with_ability(
        "Draw 2 cards. You can only use this effect of \"Pot of Plenty\" once per turn.",
    );
    let first = game.add_card_to_zone(&pot, p1, Zone::Hand).unwrap();
    let second = game.add_card_to_zone(&pot, p1, Zone::Hand).unwrap();

    game.activate(p1, first, 0, ActivationRequest::default()).unwrap();
    settle(&mut game);
    assert_eq!(game.zones(p1).unwrap().hand.len(), 3);

    let err = game
        .activate(p1, second, 0, ActivationRequest::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OncePerTurnExhausted);
    assert_eq!(game.zone_of(second), Some(Zone::Hand));
}

#[test]
fn test_unpayable_cost_leaves_snapshot_byte_identical() {
    let (mut game, p1, _) = main_phase();
    let rebirth = CardDefinition::spell(25, "Ember Rebirth", SpellKind::Normal)
        .with_ability("Pay 1000 LP; Special Summon 1 monster from your Graveyard.");
    let card = game.add_card_to_zone(&rebirth, p1, Zone::Hand).unwrap();
    game.add_card_to_zone(&cinder_scout(), p1, Zone::Graveyard)
        .unwrap();
    game.player_mut(p1).unwrap().life = 1000;

    let before = serde_json::to_string(&game).unwrap();
    let err = game
        .activate(p1, card, 0, ActivationRequest::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotPayCost);
    similar_asserts::assert_eq!(before, serde_json::to_string(&game).unwrap());

    // One more life point and the same activation goes through
    game.player_mut(p1).unwrap().life = 1001;
    let outcome = game
        .activate(p1, card, 0, ActivationRequest::default())
        .unwrap();
    assert!(matches!(outcome, ActivationOutcome::Chained(_)));
    assert_eq!(game.player(p1).unwrap().life, 1);
}

#[test]
fn test_cost_selection_round_trip() {
    let (mut game, p1, _) = main_phase();
    let trade_in = CardDefinition::spell(22, "Trade-In", SpellKind::Normal)
        .with_ability("Discard 1 card; draw 2 cards.");
    let card = game.add_card_to_zone(&trade_in, p1, Zone::Hand).unwrap();
    let a = game.add_card_to_zone(&cinder_scout(), p1, Zone::Hand).unwrap();
    let b = game.add_card_to_zone(&cinder_scout(), p1, Zone::Hand).unwrap();

    let before = serde_json::to_string(&game).unwrap();
    let outcome = game
        .activate(p1, card, 0, ActivationRequest::default())
        .unwrap();
    let ActivationOutcome::CostSelection(check) = outcome else {
        panic!("expected a cost selection, got {outcome:?}");
    };
    assert!(check.requires_selection);
    assert!(check.choices.contains(&a) && check.choices.contains(&b));
    assert!(!check.choices.contains(&card));
    similar_asserts::assert_eq!(before, serde_json::to_string(&game).unwrap());

    let outcome = game
        .activate(p1, card, 0, ActivationRequest::default().with_payment(vec![b]))
        .unwrap();
    assert!(matches!(outcome, ActivationOutcome::Chained(_)));
    assert_eq!(game.zone_of(b), Some(Zone::Graveyard));
    settle(&mut game);
    // a plus two draws
    assert_eq!(game.zones(p1).unwrap().hand.len(), 3);
}

#[test]
fn test_tribute_summons() {
    let (mut game, p1, p2) = main_phase();
    let drake = CardDefinition::monster(4, "Storm Drake", 5, 2300, 1500);
    let colossus = CardDefinition::monster(8, "Granite Colossus", 7, 2800, 2600);
    let fodder = CardDefinition::monster(1, "Gearbolt Sentinel", 4, 1800, 1200);

    let big = game.add_card_to_zone(&colossus, p1, Zone::Hand).unwrap();
    let one = game.add_card_to_zone(&fodder, p1, Zone::Board).unwrap();
    let err = game.normal_summon(p1, big, &[one]).unwrap_err();
    assert!(err.to_string().contains("requires tribute"), "{err}");
    assert_eq!(game.zone_of(one), Some(Zone::Board));

    // Opponent's monsters are not tribute material
    let theirs = game.add_card_to_zone(&fodder, p2, Zone::Board).unwrap();
    assert!(game.normal_summon(p1, big, &[one, theirs]).is_err());
    assert_eq!(game.zone_of(theirs), Some(Zone::Board));

    let two = game.add_card_to_zone(&fodder, p1, Zone::Board).unwrap();
    game.normal_summon(p1, big, &[one, two]).unwrap();
    assert_eq!(game.zone_of(big), Some(Zone::Board));
    assert_eq!(game.zone_of(one), Some(Zone::Graveyard));
    assert_eq!(game.zone_of(two), Some(Zone::Graveyard));

    // The normal summon is spent for the turn
    let small = game.add_card_to_zone(&drake, p1, Zone::Hand).unwrap();
    let err = game.normal_summon(p1, small, &[big]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidMove);
}
