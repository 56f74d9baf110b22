//! End-to-end tests for phase and turn progression through `apply`

use duel_engine::config::RulesConfig;
use duel_engine::core::{CardDefinition, PlayerId};
use duel_engine::error::ErrorKind;
use duel_engine::game::{apply, Command, CommandOutcome, GameEvent, GameState, Phase};
use duel_engine::zones::Zone;

const PHASES: [Phase; 8] = [
    Phase::Draw,
    Phase::Standby,
    Phase::Main1,
    Phase::BattleStart,
    Phase::Battle,
    Phase::BattleEnd,
    Phase::Main2,
    Phase::End,
];

fn duel() -> (GameState, PlayerId, PlayerId) {
    let mut game = GameState::new_two_player("Alice", "Bob", RulesConfig::default());
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let filler = CardDefinition::monster(1, "Gearbolt Sentinel", 4, 1800, 1200);
    for player in [p1, p2] {
        for _ in 0..3 {
            game.add_card_to_zone(&filler, player, Zone::Deck).unwrap();
        }
    }
    (game, p1, p2)
}

fn position(phase: Phase) -> usize {
    PHASES.iter().position(|p| *p == phase).unwrap()
}

#[test]
fn test_advance_never_moves_backward() {
    let (game, p1, _) = duel();
    for phase in PHASES {
        let mut from = game.clone();
        from.turn.current_phase = phase;
        match apply(&from, p1, Command::AdvancePhase) {
            Ok(transition) => {
                let CommandOutcome::PhaseEntered(landed) = transition.outcome else {
                    panic!("unexpected outcome {:?}", transition.outcome);
                };
                assert!(position(landed) > position(phase), "{phase} -> {landed}");
                assert!(!landed.is_transitional());
            }
            Err(err) => {
                assert_eq!(phase, Phase::End);
                assert_eq!(err.kind(), ErrorKind::CannotAdvance);
            }
        }
    }
}

#[test]
fn test_skip_battle_only_from_main1_or_battle() {
    let (game, p1, _) = duel();
    for phase in PHASES {
        let mut from = game.clone();
        from.turn.current_phase = phase;
        let result = apply(&from, p1, Command::SkipBattle);
        if matches!(phase, Phase::Main1 | Phase::Battle) {
            let transition = result.unwrap();
            assert_eq!(transition.outcome, CommandOutcome::PhaseEntered(Phase::Main2));
            let changes = transition
                .events
                .iter()
                .filter(|r| matches!(r.event, GameEvent::PhaseChanged { .. }))
                .count();
            assert_eq!(changes, 1);
        } else {
            let err = result.unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::CannotAdvance | ErrorKind::InvalidMove),
                "{phase}: {err}"
            );
        }
    }
}

#[test]
fn test_skip_main2_then_nothing_left_to_advance() {
    let (mut game, p1, _) = duel();
    game.turn.current_phase = Phase::Main2;

    let transition = apply(&game, p1, Command::SkipMain2).unwrap();
    assert_eq!(transition.outcome, CommandOutcome::PhaseEntered(Phase::End));

    let err = apply(&transition.state, p1, Command::AdvancePhase).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotAdvance);
}

#[test]
fn test_two_full_turns() {
    let (game, p1, p2) = duel();

    let mut state = game;
    for command in [Command::AdvancePhase, Command::AdvancePhase, Command::SkipToEnd] {
        state = apply(&state, p1, command).unwrap().state;
    }
    assert_eq!(state.turn.current_phase, Phase::End);

    // Opponent cannot end someone else's turn
    let err = apply(&state, p2, Command::PassTurn).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYourTurn);

    let transition = apply(&state, p1, Command::PassTurn).unwrap();
    assert_eq!(transition.outcome, CommandOutcome::TurnPassed { to: p2 });
    assert!(transition
        .events
        .iter()
        .any(|r| matches!(r.event, GameEvent::CardDrawn { player, .. } if player == p2)));
    let state = transition.state;
    assert_eq!(state.turn.turn_number, 2);
    assert_eq!(state.turn.current_phase, Phase::Draw);
    assert!(state.turn.is_turn_player(p2));

    // Passing from anywhere but the end phase is refused
    let err = apply(&state, p2, Command::PassTurn).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotAdvance);
}

#[test]
fn test_failed_command_leaves_snapshot_alone() {
    let (game, _, p2) = duel();
    let before = serde_json::to_string(&game).unwrap();
    assert!(apply(&game, p2, Command::AdvancePhase).is_err());
    similar_asserts::assert_eq!(before, serde_json::to_string(&game).unwrap());
}
