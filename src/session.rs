//! Line-command driver over a [`TurnEngine`].
//!
//! Text in, [`Reply`] out. The session never prints; the CLI decides where
//! replies go.

use std::fmt;

use crate::detector::feed::AimTarget;
use crate::detector::protocol::StreamMessage;
use crate::engine::config::DartifyConfig;
use crate::engine::models::*;
use crate::engine::stats::rank_players;
use crate::engine::turn_engine::TurnEngine;
use crate::games::x01::board::{parse_input, Throw, QUICK_PICKS};
use crate::games::x01::checkout::{all_checkout_options, points_until_checkout, suggest_checkout};

pub const HELP: &str = "\
commands:
  add <name>                 add a player (not during a game)
  remove <id|name>           remove a player
  start [501|301|cricket] [--double-out|--single-out]
  reset                      back to setup, same players
  <dart>                     record a throw: 60, T20, D16, 25, Bull, Miss
  undo                       take back the last dart
  next                       end the current turn early
  hint                       checkout suggestions for the current player
  stats                      per-player statistics
  show                       scoreboard
  json                       state snapshot as JSON
  camera on|off              start or stop the detector feed
  picks                      quick-pick values
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    Remove(String),
    Start {
        game_type: Option<GameType>,
        double_out: Option<bool>,
    },
    Reset,
    Throw(Throw),
    Undo,
    Next,
    Hint,
    Stats,
    Show,
    Json,
    Camera(bool),
    Picks,
    Help,
    Quit,
}

/// Parse one input line. Anything that is not a keyword is read as a throw.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let cmd = match word.to_lowercase().as_str() {
        "add" if rest.is_empty() => return Err("usage: add <name>".into()),
        "add" => Command::Add(rest.to_string()),
        "remove" | "rm" if rest.is_empty() => return Err("usage: remove <id|name>".into()),
        "remove" | "rm" => Command::Remove(rest.to_string()),
        "start" => parse_start(rest)?,
        "reset" => Command::Reset,
        "undo" | "u" => Command::Undo,
        "next" | "n" => Command::Next,
        "hint" => Command::Hint,
        "stats" => Command::Stats,
        "show" | "s" => Command::Show,
        "json" => Command::Json,
        "camera" => match rest.to_lowercase().as_str() {
            "on" => Command::Camera(true),
            "off" => Command::Camera(false),
            _ => return Err("usage: camera on|off".into()),
        },
        "picks" => Command::Picks,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Throw(parse_input(line).map_err(|e| e.to_string())?),
    };
    Ok(cmd)
}

fn parse_start(args: &str) -> Result<Command, String> {
    let mut game_type = None;
    let mut double_out = None;
    for arg in args.split_whitespace() {
        match arg.to_lowercase().as_str() {
            "--double-out" => double_out = Some(true),
            "--single-out" => double_out = Some(false),
            other => match GameType::from_str(other) {
                Some(gt) => game_type = Some(gt),
                None => return Err(format!("unknown game type '{}'", arg)),
            },
        }
    }
    Ok(Command::Start { game_type, double_out })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(String),
    /// Input was refused; the state did not change.
    Rejected(String),
    /// Ask the driver to start or stop the detector feed.
    Camera(bool),
    Quit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Message(m) => f.write_str(m),
            Reply::Rejected(m) => write!(f, "error: {}", m),
            Reply::Camera(true) => f.write_str("camera on"),
            Reply::Camera(false) => f.write_str("camera off"),
            Reply::Quit => f.write_str("bye"),
        }
    }
}

pub struct Session {
    engine: TurnEngine,
    game_type: GameType,
    options: GameOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameType::default(), GameOptions::default())
    }
}

impl Session {
    pub fn new(game_type: GameType, options: GameOptions) -> Self {
        Self {
            engine: TurnEngine::with_game(game_type, options),
            game_type,
            options,
        }
    }

    /// Session with the configured variant and roster.
    pub fn from_config(config: &DartifyConfig) -> Self {
        let mut session = Self::new(config.game.game_type, config.game.options());
        for name in &config.game.players {
            session.engine.add_player(name);
        }
        session
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// What a simulated thrower should aim for right now.
    pub fn aim_target(&self) -> AimTarget {
        let state = self.engine.state();
        AimTarget {
            score: state.current_player().map(|p| p.score).unwrap_or(0),
            double_out: state.options.double_out,
            active: state.is_in_progress(),
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Message(String::new());
        }
        match parse_command(line) {
            Ok(cmd) => self.execute(cmd),
            Err(e) => {
                tracing::warn!(input = line.trim(), error = %e, "rejected input");
                Reply::Rejected(e)
            }
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Add(name) => self.add(&name),
            Command::Remove(who) => self.remove(&who),
            Command::Start { game_type, double_out } => {
                let game_type = game_type.unwrap_or(self.game_type);
                let options = GameOptions {
                    double_out: double_out.unwrap_or(self.options.double_out),
                };
                if self.engine.start_game(game_type, options) {
                    self.game_type = game_type;
                    self.options = options;
                    Reply::Message(format!("{}\n{}", start_banner(game_type, options), self.render()))
                } else {
                    Reply::Rejected("add a player first".into())
                }
            }
            Command::Reset => {
                self.engine.reset_game();
                Reply::Message("game reset".into())
            }
            Command::Throw(throw) => self.throw(throw),
            Command::Undo => self.undo(),
            Command::Next => {
                if self.engine.advance_turn() {
                    Reply::Message(self.render())
                } else {
                    Reply::Rejected("no game in progress".into())
                }
            }
            Command::Hint => Reply::Message(self.hint()),
            Command::Stats => Reply::Message(self.stats()),
            Command::Show => Reply::Message(self.render()),
            Command::Json => match serde_json::to_string_pretty(&self.engine.snapshot()) {
                Ok(json) => Reply::Message(json),
                Err(e) => Reply::Rejected(format!("snapshot failed: {}", e)),
            },
            Command::Camera(on) => Reply::Camera(on),
            Command::Picks => Reply::Message(
                QUICK_PICKS
                    .iter()
                    .map(|q| format!("{}={}", q.label, q.value))
                    .collect::<Vec<_>>()
                    .join("  "),
            ),
            Command::Help => Reply::Message(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    /// Apply one detector frame. Each detected dart is validated and
    /// recorded in order, keeping its ring for the double-out check.
    ///
    /// The whole frame belongs to the player on throw when it arrives. Darts
    /// left over after a bust, a third dart or a checkout are not applied.
    pub fn apply_frame(&mut self, msg: &StreamMessage) -> Vec<Reply> {
        if let Some(err) = &msg.error {
            tracing::warn!(error = %err, "detector error");
            return vec![Reply::Rejected(format!("detector: {}", err))];
        }
        let Some(score) = &msg.score else {
            return Vec::new();
        };
        let throws = match score.detected_throws() {
            Ok(throws) => throws,
            Err(e) => {
                tracing::warn!(error = %e, "rejected detector frame");
                return vec![Reply::Rejected(e.to_string())];
            }
        };

        let thrower = self.engine.state().current_player_index;
        let mut replies = Vec::with_capacity(throws.len());
        let mut pending = throws.into_iter();
        for throw in pending.by_ref() {
            let (reply, turn_over) = self.throw_with_outcome(throw);
            replies.push(reply);
            if turn_over || self.engine.state().current_player_index != thrower {
                break;
            }
        }
        let dropped: Vec<String> = pending.map(|t| throw_label(&t)).collect();
        if !dropped.is_empty() {
            tracing::warn!(dropped = ?dropped, "detector darts after the turn ended");
            replies.push(Reply::Rejected(format!(
                "turn already over, not applied: {}",
                dropped.join(" ")
            )));
        }
        replies
    }

    fn add(&mut self, name: &str) -> Reply {
        match self.engine.add_player(name) {
            Some(id) => Reply::Message(format!("added {} as {}", name, id)),
            None => Reply::Rejected("cannot add players during a game".into()),
        }
    }

    fn remove(&mut self, who: &str) -> Reply {
        let id = self
            .engine
            .state()
            .players
            .iter()
            .find(|p| p.id == who || p.name.eq_ignore_ascii_case(who))
            .map(|p| p.id.clone());
        match id {
            Some(id) if self.engine.remove_player(&id) => Reply::Message(format!("removed {}", id)),
            _ => Reply::Rejected(format!("no player '{}'", who)),
        }
    }

    fn throw(&mut self, throw: Throw) -> Reply {
        self.throw_with_outcome(throw).0
    }

    /// Record a throw; the flag is true when it closed the current turn.
    fn throw_with_outcome(&mut self, throw: Throw) -> (Reply, bool) {
        let value = throw_label(&throw);
        let name = self
            .engine
            .state()
            .current_player()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let (text, turn_over) = match self.engine.record(throw) {
            ThrowOutcome::Ignored => return (Reply::Rejected("no game in progress".into()), true),
            ThrowOutcome::Scored { remaining } => {
                (format!("{}: {} ({} left)", name, value, remaining), false)
            }
            ThrowOutcome::TurnComplete { .. } => {
                (format!("{}: {}, turn over\n{}", name, value, self.render()), true)
            }
            ThrowOutcome::Bust { reason } => (
                format!("{}: {} BUST ({})\n{}", name, value, reason.as_str(), self.render()),
                true,
            ),
            ThrowOutcome::Checkout { darts } => {
                let darts: Vec<String> = darts.iter().map(u32::to_string).collect();
                (format!("{} wins! checkout {}\n{}", name, darts.join(" "), self.stats()), true)
            }
        };
        (Reply::Message(text), turn_over)
    }

    fn undo(&mut self) -> Reply {
        match self.engine.undo_last_throw() {
            UndoOutcome::Nothing => Reply::Rejected("nothing to undo".into()),
            UndoOutcome::WithinTurn { value } => {
                Reply::Message(format!("undid {}\n{}", value, self.render()))
            }
            UndoOutcome::ReopenedTurn { .. } | UndoOutcome::ReopenedCheckout => {
                Reply::Message(format!("reopened previous turn\n{}", self.render()))
            }
        }
    }

    /// Checkout suggestion for the current player.
    pub fn hint(&self) -> String {
        let state = self.engine.state();
        let Some(player) = state.current_player() else {
            return "no players".into();
        };
        if !state.game_type.is_countdown() {
            return format!("no checkout hints for {}", state.game_type);
        }
        let double_out = state.options.double_out;
        let suggestion = suggest_checkout(player.score, double_out);
        match suggestion.sequence_label {
            Some(route) => {
                let options: Vec<String> = all_checkout_options(player.score, double_out)
                    .into_iter()
                    .map(|o| o.label)
                    .collect();
                format!("{} on {}: {}  (options: {})", player.name, player.score, route, options.join(", "))
            }
            None => match points_until_checkout(player.score) {
                Some(p) => format!("{} points until possible checkout", p),
                None => format!("{} on {}: no checkout", player.name, player.score),
            },
        }
    }

    /// Ranked statistics table.
    pub fn stats(&self) -> String {
        let state = self.engine.state();
        let ranked = rank_players(&state.players, state.winner.as_ref());
        let mut lines = vec![format!(
            "{:<3} {:<12} {:>6} {:>5} {:>5} {:>5} {:>6} {:>4} {:>4} {:>4}",
            "#", "player", "avg", "darts", "high", "best", "miss%", "100+", "140+", "180"
        )];
        for (rank, s) in ranked.iter().enumerate() {
            lines.push(format!(
                "{:<3} {:<12} {:>6.1} {:>5} {:>5} {:>5} {:>6.1} {:>4} {:>4} {:>4}",
                rank + 1,
                s.name,
                s.average,
                s.total_darts,
                s.highest_dart,
                s.best_turn,
                s.miss_percentage,
                s.tons,
                s.ton_forties,
                s.maximums,
            ));
            if let Some(darts) = &s.checkout {
                let darts: Vec<String> = darts.iter().map(u32::to_string).collect();
                lines.push(format!("    checkout: {}", darts.join(" ")));
            }
        }
        lines.join("\n")
    }

    /// Scoreboard.
    pub fn render(&self) -> String {
        let state = self.engine.state();
        let phase = match state.phase {
            GamePhase::AwaitingStart => "setup",
            GamePhase::InProgress => "playing",
            GamePhase::Over => "game over",
        };
        let mut lines = vec![format!(
            "{} | {} | round {} | {}",
            state.game_type,
            if state.options.double_out { "double out" } else { "single out" },
            state.round,
            phase
        )];
        for (i, p) in state.players.iter().enumerate() {
            let marker = if i == state.current_player_index && state.is_in_progress() { ">" } else { " " };
            let pending = if p.throws.is_empty() {
                String::new()
            } else {
                let t: Vec<String> = p.throws.iter().map(u32::to_string).collect();
                format!("  [{}]", t.join(" "))
            };
            lines.push(format!(
                "{} {:<4} {:<12} {:>4}  avg {:>5.1}{}",
                marker, p.id, p.name, p.score, p.average, pending
            ));
        }
        if let Some(w) = &state.winner {
            lines.push(format!("winner: {} in {} turns", w.name, w.turn_count));
        } else if state.is_in_progress() && state.game_type.is_countdown() {
            if let Some(route) = state
                .current_player()
                .and_then(|p| suggest_checkout(p.score, state.options.double_out).sequence_label)
            {
                lines.push(format!("checkout: {}", route));
            }
        }
        lines.join("\n")
    }
}

fn throw_label(throw: &Throw) -> String {
    match throw {
        Throw::Value(v) => v.to_string(),
        Throw::Dart(d) => d.label(),
    }
}

fn start_banner(game_type: GameType, options: GameOptions) -> String {
    format!(
        "started {} ({})",
        game_type,
        if options.double_out { "double out" } else { "single out" }
    )
}
