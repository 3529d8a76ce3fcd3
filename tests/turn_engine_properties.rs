//! Turn engine invariants under long random sequences of throws, early turn
//! ends and undos, plus the end-to-end scoring scenarios.
//!
//! Run with:
//!     cargo test --test turn_engine_properties

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dartify_engine::engine::models::*;
use dartify_engine::engine::turn_engine::TurnEngine;
use dartify_engine::games::x01::board::all_dart_sections;

fn dart_values() -> Vec<u32> {
    all_dart_sections().into_iter().map(|s| s.value).collect()
}

fn started(names: &[&str], game_type: GameType, double_out: bool) -> TurnEngine {
    let mut engine = TurnEngine::new();
    for n in names {
        engine.add_player(n);
    }
    assert!(engine.start_game(game_type, GameOptions { double_out }));
    engine
}

fn check_invariants(state: &GameState) {
    if state.players.is_empty() {
        return;
    }
    assert!(state.current_player_index < state.players.len());
    assert!(state.round >= 1);
    for (i, p) in state.players.iter().enumerate() {
        assert!(p.score <= p.initial_score, "{} above start", p.id);
        if state.game_type.is_countdown() {
            let pending: u32 = p.throws.iter().sum();
            assert_eq!(p.score + p.history_total() + pending, p.initial_score, "{} score drift", p.id);
        }
        assert!(p.throws.len() < DARTS_PER_TURN);
        if i != state.current_player_index {
            assert!(p.throws.is_empty(), "{} holds darts out of turn", p.id);
        }
        let scored = p.scored_turns().count();
        let expected = if scored == 0 {
            0.0
        } else {
            p.history_total() as f64 / scored as f64
        };
        assert!((p.average - expected).abs() < 1e-9);
    }
    let current = &state.players[state.current_player_index];
    if state.is_in_progress() {
        assert_eq!(state.darts_thrown, current.throws.len());
    }

    if state.is_in_progress() {
        for (i, p) in state.players.iter().enumerate() {
            let done = if i < state.current_player_index { state.round } else { state.round - 1 };
            assert_eq!(p.history.len() as u32, done, "{} history rows", p.id);
        }
        assert!(state.winner.is_none());
    }
    if state.is_game_over() {
        let winner = state.winner.as_ref().unwrap();
        assert_eq!(winner.id, current.id);
        assert_eq!(Some(state.darts_thrown), current.checkout.as_ref().map(Vec::len));
        assert_eq!(current.score, 0);
        assert!(current.checkout.is_some());
    }
}

fn random_play(seed: u64, game_type: GameType, double_out: bool, players: &[&str]) {
    let values = dart_values();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut engine = started(players, game_type, double_out);

    for _ in 0..600 {
        if engine.state().is_game_over() {
            // Resume by taking back the winning dart, or start over.
            if rng.gen_bool(0.5) {
                assert_eq!(engine.undo_last_throw(), UndoOutcome::ReopenedCheckout);
            } else {
                engine.start_game(game_type, GameOptions { double_out });
            }
            check_invariants(engine.state());
            continue;
        }
        let roll: f64 = rng.gen();
        let before = engine.snapshot();
        if roll < 0.85 {
            let v = *values.choose(&mut rng).unwrap();
            let outcome = engine.record_throw(v);
            assert_ne!(outcome, ThrowOutcome::Ignored);
            check_invariants(engine.state());

            // Every throw is exactly reversible.
            engine.undo_last_throw();
            assert_eq!(engine.snapshot(), before, "undo of {} after {:?}", v, outcome);
            engine.record_throw(v);
        } else if roll < 0.93 {
            assert!(engine.advance_turn());
            check_invariants(engine.state());
            engine.undo_last_throw();
            assert_eq!(engine.snapshot(), before, "undo of advance_turn");
            engine.advance_turn();
        } else {
            engine.undo_last_throw();
        }
        check_invariants(engine.state());
    }
}

#[test]
fn test_random_play_double_out() {
    for seed in 0..20 {
        random_play(seed, GameType::X501, true, &["A", "B", "C"]);
    }
}

#[test]
fn test_random_play_single_out() {
    for seed in 100..110 {
        random_play(seed, GameType::X301, false, &["A", "B"]);
    }
}

#[test]
fn test_random_play_solo() {
    for seed in 200..210 {
        random_play(seed, GameType::X301, true, &["A"]);
    }
}

#[test]
fn test_random_play_cricket_never_ends() {
    let values = dart_values();
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = started(&["A", "B"], GameType::Cricket, true);
    for _ in 0..300 {
        engine.record_throw(*values.choose(&mut rng).unwrap());
        check_invariants(engine.state());
    }
    assert!(engine.state().is_in_progress());
    assert_eq!(engine.state().round, 51);
}

#[test]
fn test_end_to_end_single_player() {
    let mut engine = started(&["A"], GameType::X501, true);
    for v in [60, 60, 60] {
        engine.record_throw(v);
    }
    let a = &engine.state().players[0];
    assert_eq!(a.score, 321);
    assert_eq!(a.history.len(), 1);
    assert_eq!(a.history[0].darts, [60, 60, 60]);
    assert!((a.average - 180.0).abs() < 1e-9);

    for v in [60, 60, 21] {
        engine.record_throw(v);
    }
    assert_eq!(engine.state().players[0].score, 180);

    assert_eq!(engine.record_throw(40), ThrowOutcome::Scored { remaining: 140 });
    assert!(!engine.state().is_game_over());
    engine.record_throw(60);
    assert_eq!(engine.record_throw(40), ThrowOutcome::TurnComplete { remaining: 40 });

    assert_eq!(engine.record_throw(40), ThrowOutcome::Checkout { darts: vec![40] });
    let state = engine.state();
    assert!(state.is_game_over());
    let winner = state.winner.as_ref().unwrap();
    assert_eq!(winner.name, "A");
    assert_eq!(winner.checkout, Some(vec![40]));
    assert_eq!(winner.turn_count, 4);
}

#[test]
fn test_three_player_wraparound() {
    let mut engine = started(&["A", "B", "C"], GameType::X501, true);
    let mut order = vec![engine.state().current_player_index];
    let mut rounds = vec![engine.state().round];
    for _ in 0..6 {
        for v in [20, 19, 18] {
            engine.record_throw(v);
        }
        order.push(engine.state().current_player_index);
        rounds.push(engine.state().round);
    }
    assert_eq!(order, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(rounds, vec![1, 1, 1, 2, 2, 2, 3]);
}

#[test]
fn test_undo_walks_back_to_start() {
    let mut engine = started(&["A", "B"], GameType::X501, true);
    let start = engine.snapshot();
    for v in [60, 57, 54, 20, 20, 20, 5] {
        engine.record_throw(v);
    }
    let mut undos = 0;
    while engine.undo_last_throw() != UndoOutcome::Nothing {
        undos += 1;
        check_invariants(engine.state());
    }
    assert_eq!(undos, 7);
    assert_eq!(engine.snapshot(), start);
}
