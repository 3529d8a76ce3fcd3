//! Core engine data types: players, turn history rows and the game state
//! snapshot every presentation layer reads.

use serde::{Deserialize, Serialize};

pub type PlayerId = String;

/// Darts per turn.
pub const DARTS_PER_TURN: usize = 3;

/// Closed set of game variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameType {
    #[default]
    #[serde(rename = "501")]
    X501,
    #[serde(rename = "301")]
    X301,
    #[serde(alias = "cricket")]
    Cricket,
}

impl GameType {
    /// Starting countdown value. Cricket has no countdown.
    pub fn initial_score(&self) -> u32 {
        match self {
            GameType::X501 => 501,
            GameType::X301 => 301,
            GameType::Cricket => 0,
        }
    }

    /// True for the 01-style variants that subtract throws from a countdown.
    pub fn is_countdown(&self) -> bool {
        matches!(self, GameType::X501 | GameType::X301)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::X501 => "501",
            GameType::X301 => "301",
            GameType::Cricket => "Cricket",
        }
    }

    /// Parse a variant name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "501" => Some(GameType::X501),
            "301" => Some(GameType::X301),
            "cricket" => Some(GameType::Cricket),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options committed at game start and fixed for the game's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    #[serde(default = "default_double_out")]
    pub double_out: bool,
}

fn default_double_out() -> bool {
    true
}

impl Default for GameOptions {
    fn default() -> Self {
        Self { double_out: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BustReason {
    /// The dart took the score below zero.
    Overshoot,
    /// Double-out left the player on 1, which cannot be finished.
    LeftOnOne,
    /// The score reached zero but the last dart was not a double.
    NoDoubleFinish,
}

impl BustReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BustReason::Overshoot => "overshoot",
            BustReason::LeftOnOne => "left on one",
            BustReason::NoDoubleFinish => "no double finish",
        }
    }
}

/// How a turn in `history` was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum TurnOutcome {
    /// All three darts scored.
    Completed,
    /// The player ended the turn early via `advance_turn`.
    EndedEarly,
    /// `advance_turn` with no darts thrown. Kept for undo, excluded from
    /// scoring and statistics.
    Passed,
    Bust(BustReason),
    Checkout,
}

/// One completed turn.
///
/// `darts` is the fixed-length statistics row: raw darts, zero-padded for a
/// short turn, all zeros for a bust. `thrown` keeps the darts exactly as they
/// were recorded so undo can reopen the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub darts: [u32; DARTS_PER_TURN],
    pub thrown: Vec<u32>,
    pub outcome: TurnOutcome,
}

impl TurnRecord {
    pub fn scored(thrown: Vec<u32>, outcome: TurnOutcome) -> Self {
        let mut darts = [0; DARTS_PER_TURN];
        for (slot, v) in darts.iter_mut().zip(thrown.iter()) {
            *slot = *v;
        }
        Self { darts, thrown, outcome }
    }

    pub fn bust(thrown: Vec<u32>, reason: BustReason) -> Self {
        Self {
            darts: [0; DARTS_PER_TURN],
            thrown,
            outcome: TurnOutcome::Bust(reason),
        }
    }

    /// A turn passed without throwing.
    pub fn passed() -> Self {
        Self {
            darts: [0; DARTS_PER_TURN],
            thrown: Vec::new(),
            outcome: TurnOutcome::Passed,
        }
    }

    /// False for a pass, which does not count towards averages or stats.
    pub fn is_scored(&self) -> bool {
        self.outcome != TurnOutcome::Passed
    }

    /// Points this row contributes to the countdown.
    pub fn total(&self) -> u32 {
        self.darts.iter().sum()
    }

    /// True when the turn was closed by a dart rather than by `advance_turn`.
    pub fn closed_by_dart(&self) -> bool {
        !matches!(self.outcome, TurnOutcome::EndedEarly | TurnOutcome::Passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub initial_score: u32,
    pub score: u32,
    /// Pending darts of the in-progress turn.
    #[serde(default)]
    pub throws: Vec<u32>,
    #[serde(default)]
    pub history: Vec<TurnRecord>,
    #[serde(default)]
    pub average: f64,
    /// Darts of the winning turn; winner only.
    #[serde(default)]
    pub checkout: Option<Vec<u32>>,
    /// Turns taken when the player won; winner only.
    #[serde(default)]
    pub turn_count: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, initial_score: u32) -> Self {
        Self {
            id,
            name: name.into(),
            initial_score,
            score: initial_score,
            throws: Vec::new(),
            history: Vec::new(),
            average: 0.0,
            checkout: None,
            turn_count: 0,
        }
    }

    /// Reinitialise for a fresh game starting at `initial_score`.
    pub fn reset(&mut self, initial_score: u32) {
        self.initial_score = initial_score;
        self.score = initial_score;
        self.throws.clear();
        self.history.clear();
        self.average = 0.0;
        self.checkout = None;
        self.turn_count = 0;
    }

    /// History rows that count for scoring, skipping passes.
    pub fn scored_turns(&self) -> impl Iterator<Item = &TurnRecord> + '_ {
        self.history.iter().filter(|t| t.is_scored())
    }

    /// All scored history darts, flattened in throw order.
    pub fn history_darts(&self) -> impl Iterator<Item = u32> + '_ {
        self.scored_turns().flat_map(|t| t.darts.iter().copied())
    }

    /// Sum of every scored history row.
    pub fn history_total(&self) -> u32 {
        self.scored_turns().map(TurnRecord::total).sum()
    }

    /// Average per three darts over the scored turns; 0 with none.
    pub fn recalculate_average(&mut self) {
        let count = self.scored_turns().count() * DARTS_PER_TURN;
        self.average = if count == 0 {
            0.0
        } else {
            self.history_total() as f64 / count as f64 * DARTS_PER_TURN as f64
        };
    }
}

/// Coarse lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    AwaitingStart,
    InProgress,
    Over,
}

/// The authoritative game state. Only `TurnEngine` mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub game_type: GameType,
    pub options: GameOptions,
    pub phase: GamePhase,
    pub darts_thrown: usize,
    /// 1-based; increments when turn order wraps back to the first player.
    pub round: u32,
    #[serde(default)]
    pub winner: Option<Player>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            current_player_index: 0,
            game_type: GameType::default(),
            options: GameOptions::default(),
            phase: GamePhase::AwaitingStart,
            darts_thrown: 0,
            round: 1,
            winner: None,
        }
    }
}

impl GameState {
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == GamePhase::InProgress
    }

    /// Completed full rounds of turns.
    pub fn turn_count(&self) -> u32 {
        self.round.saturating_sub(1)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Result of `TurnEngine::record_throw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrowOutcome {
    /// Not in a game; nothing changed.
    Ignored,
    /// The dart counted and the same player throws again.
    Scored { remaining: u32 },
    /// The third dart counted and the turn passed on.
    TurnComplete { remaining: u32 },
    /// The turn was voided and passed on.
    Bust { reason: BustReason },
    /// The player won with these darts.
    Checkout { darts: Vec<u32> },
}

/// Result of `TurnEngine::undo_last_throw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Nothing,
    /// A pending dart of the current turn was removed.
    WithinTurn { value: u32 },
    /// The previous turn was reopened on this player.
    ReopenedTurn { player_index: usize },
    /// The winning dart was taken back and the game resumed.
    ReopenedCheckout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_parsing() {
        assert_eq!(GameType::from_str("501"), Some(GameType::X501));
        assert_eq!(GameType::from_str(" CRICKET "), Some(GameType::Cricket));
        assert_eq!(GameType::from_str("701"), None);
        assert_eq!(GameType::X301.initial_score(), 301);
        assert!(!GameType::Cricket.is_countdown());
    }

    #[test]
    fn test_average_is_per_three_darts() {
        let mut p = Player::new("p1".into(), "A", 501);
        p.history.push(TurnRecord::scored(vec![60, 60, 60], TurnOutcome::Completed));
        p.history.push(TurnRecord::bust(vec![20, 20], BustReason::Overshoot));
        p.recalculate_average();
        assert!((p.average - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pass_does_not_dilute_average() {
        let mut p = Player::new("p1".into(), "A", 501);
        p.history.push(TurnRecord::passed());
        p.recalculate_average();
        assert_eq!(p.average, 0.0);
        p.history.push(TurnRecord::scored(vec![60, 60, 60], TurnOutcome::Completed));
        p.recalculate_average();
        assert!((p.average - 180.0).abs() < 1e-9);
        assert_eq!(p.history_darts().count(), 3);
        assert!(!p.history[0].closed_by_dart());
    }

    #[test]
    fn test_average_without_history_is_zero() {
        let mut p = Player::new("p1".into(), "A", 501);
        p.recalculate_average();
        assert_eq!(p.average, 0.0);
    }

    #[test]
    fn test_short_turn_is_padded() {
        let t = TurnRecord::scored(vec![20], TurnOutcome::EndedEarly);
        assert_eq!(t.darts, [20, 0, 0]);
        assert_eq!(t.thrown, vec![20]);
        assert!(!t.closed_by_dart());
    }

    #[test]
    fn test_game_type_serde_names() {
        let json = serde_json::to_string(&GameType::X501).unwrap();
        assert_eq!(json, "\"501\"");
        let parsed: GameType = serde_json::from_str("\"Cricket\"").unwrap();
        assert_eq!(parsed, GameType::Cricket);
    }
}
