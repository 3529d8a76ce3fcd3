//! Drive whole games through the text command session.

use std::io::Write;

use dartify_engine::engine::config::load_config;
use dartify_engine::engine::models::{GamePhase, GameType};
use dartify_engine::session::{Reply, Session};

fn run(session: &mut Session, lines: &[&str]) -> Vec<Reply> {
    lines.iter().map(|l| session.handle_line(l)).collect()
}

#[test]
fn test_session_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[game]\ngame_type = \"301\"\ndouble_out = false\nplayers = [\"Ann\", \"Bob\"]"
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();
    let mut session = Session::from_config(&config);
    assert_eq!(session.state().players.len(), 2);

    run(&mut session, &["start"]);
    let state = session.state();
    assert_eq!(state.game_type, GameType::X301);
    assert!(!state.options.double_out);
    assert!(state.players.iter().all(|p| p.score == 301));
}

#[test]
fn test_two_player_game_to_finish() {
    let mut session = Session::default();
    run(&mut session, &["add Ann", "add Bob", "start 301"]);

    // Ann: 180, Bob: 3 darts of 1.
    run(&mut session, &["T20", "T20", "T20", "1", "1", "1"]);
    // Ann: 121 -> T20 T19 D2.
    run(&mut session, &["T20", "T19"]);
    let replies = run(&mut session, &["D2"]);
    assert!(replies[0].to_string().starts_with("Ann wins! checkout 60 57 4"));

    let state = session.state();
    assert_eq!(state.phase, GamePhase::Over);
    assert_eq!(state.winner.as_ref().unwrap().name, "Ann");

    // Further throws are refused until a new game starts.
    assert!(matches!(session.handle_line("20"), Reply::Rejected(_)));
    let stats = session.stats();
    let ann_line = stats.lines().nth(1).unwrap();
    assert!(ann_line.contains("Ann"), "{stats}");
}

#[test]
fn test_bust_message_and_rotation() {
    let mut session = Session::default();
    run(&mut session, &["add Ann", "add Bob", "start 301"]);
    run(&mut session, &["T20", "T20", "T20", "next"]);
    run(&mut session, &["T20"]);
    // 61 - 60 leaves 1: bust.
    let reply = session.handle_line("T20");
    assert!(reply.to_string().contains("BUST (left on one)"), "{reply}");
    assert_eq!(session.state().players[0].score, 121);
    assert_eq!(session.state().current_player_index, 1);
}

#[test]
fn test_next_pads_and_undo_reopens() {
    let mut session = Session::default();
    run(&mut session, &["add Ann", "add Bob", "start"]);
    run(&mut session, &["D20", "next"]);
    assert_eq!(session.state().players[0].history[0].darts, [40, 0, 0]);
    assert_eq!(session.state().current_player_index, 1);

    run(&mut session, &["undo"]);
    assert_eq!(session.state().current_player_index, 0);
    assert_eq!(session.state().players[0].throws, vec![40]);
    assert_eq!(session.state().players[0].score, 461);
}

#[test]
fn test_reset_and_restart_with_new_player() {
    let mut session = Session::default();
    run(&mut session, &["add Ann", "start", "T20", "reset", "add Bob", "start cricket"]);
    let state = session.state();
    assert_eq!(state.game_type, GameType::Cricket);
    assert_eq!(state.players.len(), 2);
    assert!(state.players.iter().all(|p| p.history.is_empty() && p.score == 0));
    assert_eq!(session.hint(), "no checkout hints for Cricket");
}

#[test]
fn test_camera_and_quit_replies() {
    let mut session = Session::default();
    assert_eq!(session.handle_line("camera on"), Reply::Camera(true));
    assert_eq!(session.handle_line("quit"), Reply::Quit);
    assert!(matches!(session.handle_line("camera sideways"), Reply::Rejected(_)));
}
