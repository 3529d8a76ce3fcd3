//! Turn engine: owns the game state and applies the throw, bust, checkout,
//! turn-rotation and undo rules.
//!
//! Every operation is total. Calls that make no sense in the current phase
//! (a throw with no players, an undo at the start of a game) leave the state
//! untouched and report `Ignored` / `Nothing` / `false`.

use crate::engine::models::*;
use crate::games::x01::board::{Dart, Throw};
use crate::games::x01::checkout::is_double;

#[derive(Debug, Clone, Default)]
pub struct TurnEngine {
    state: GameState,
    next_player_seq: u32,
}

impl TurnEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose roster will be created for `game_type`.
    pub fn with_game(game_type: GameType, options: GameOptions) -> Self {
        let mut engine = Self::new();
        engine.state.game_type = game_type;
        engine.state.options = options;
        engine
    }

    /// Read-only view of the authoritative state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy of the state for consumers that outlive the borrow.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    // ------------------------------------------------------------------ //
    //  Roster
    // ------------------------------------------------------------------ //

    /// Append a player. Refused while a game is in progress.
    pub fn add_player(&mut self, name: &str) -> Option<PlayerId> {
        if self.state.is_in_progress() {
            tracing::warn!(name, "cannot add a player while a game is in progress");
            return None;
        }
        self.next_player_seq += 1;
        let id: PlayerId = format!("p{}", self.next_player_seq);
        let player = Player::new(id.clone(), name, self.state.game_type.initial_score());
        self.state.players.push(player);
        tracing::info!(player = %id, name, "player added");
        Some(id)
    }

    /// Remove a player by id, keeping `current_player_index` on a remaining
    /// player. Returns false if no such player exists.
    pub fn remove_player(&mut self, id: &str) -> bool {
        let Some(pos) = self.state.players.iter().position(|p| p.id == id) else {
            return false;
        };
        self.state.players.remove(pos);
        tracing::info!(player = %id, "player removed");

        if self.state.players.is_empty() {
            self.state.current_player_index = 0;
            self.state.darts_thrown = 0;
            self.state.round = 1;
            if self.state.is_in_progress() {
                self.state.phase = GamePhase::AwaitingStart;
            }
            return true;
        }

        let current = self.state.current_player_index;
        if pos < current {
            self.state.current_player_index -= 1;
        } else if pos == current {
            // The next player in order inherits the turn.
            self.state.darts_thrown = 0;
            if current >= self.state.players.len() {
                self.state.current_player_index = 0;
                if self.state.is_in_progress() {
                    self.state.round += 1;
                }
            }
        }
        if let Some(p) = self.state.players.get(self.state.current_player_index) {
            self.state.darts_thrown = p.throws.len();
        }
        true
    }

    // ------------------------------------------------------------------ //
    //  Lifecycle
    // ------------------------------------------------------------------ //

    /// Start a new game with the current roster. No-op without players.
    pub fn start_game(&mut self, game_type: GameType, options: GameOptions) -> bool {
        if self.state.players.is_empty() {
            return false;
        }
        let initial = game_type.initial_score();
        for p in &mut self.state.players {
            p.reset(initial);
        }
        self.state.game_type = game_type;
        self.state.options = options;
        self.state.current_player_index = 0;
        self.state.round = 1;
        self.state.darts_thrown = 0;
        self.state.winner = None;
        self.state.phase = GamePhase::InProgress;
        tracing::info!(
            game_type = %game_type,
            double_out = options.double_out,
            players = self.state.players.len(),
            "game started"
        );
        true
    }

    /// Back to `AwaitingStart` with the same roster, variant and options.
    pub fn reset_game(&mut self) {
        for p in &mut self.state.players {
            let initial = p.initial_score;
            p.reset(initial);
        }
        self.state.current_player_index = 0;
        self.state.round = 1;
        self.state.darts_thrown = 0;
        self.state.winner = None;
        self.state.phase = GamePhase::AwaitingStart;
        tracing::info!(game_type = %self.state.game_type, "game reset");
    }

    // ------------------------------------------------------------------ //
    //  Throws
    // ------------------------------------------------------------------ //

    /// Apply one dart worth `value` to the current player. Under double-out
    /// a finish on `value` counts when [`is_double`] holds for the value.
    ///
    /// The value is not range-checked here; callers validate at the input
    /// boundary.
    pub fn record_throw(&mut self, value: u32) -> ThrowOutcome {
        self.apply_throw(value, is_double(value))
    }

    /// Apply a dart whose segment is known. Under double-out only a dart in
    /// the double ring or the bullseye finishes, so a single 20 from 20 busts.
    pub fn record_dart(&mut self, dart: Dart) -> ThrowOutcome {
        self.apply_throw(dart.value(), dart.is_double())
    }

    /// Route a boundary-validated throw to the matching entry point.
    pub fn record(&mut self, throw: Throw) -> ThrowOutcome {
        match throw {
            Throw::Value(v) => self.record_throw(v),
            Throw::Dart(d) => self.record_dart(d),
        }
    }

    fn apply_throw(&mut self, value: u32, finishes_on_double: bool) -> ThrowOutcome {
        if !self.state.is_in_progress() || self.state.players.is_empty() {
            return ThrowOutcome::Ignored;
        }
        let idx = self.state.current_player_index;
        let double_out = self.state.options.double_out;
        let countdown = self.state.game_type.is_countdown();

        let player = &mut self.state.players[idx];
        player.throws.push(value);

        if !countdown {
            // Cricket scoring is not implemented: darts and turns are tracked only.
            let remaining = player.score;
            return self.after_scoring_dart(idx, remaining);
        }

        let candidate = player.score as i64 - value as i64;
        let bust = if candidate < 0 {
            Some(BustReason::Overshoot)
        } else if double_out && candidate == 1 {
            Some(BustReason::LeftOnOne)
        } else if candidate == 0 && double_out && !finishes_on_double {
            Some(BustReason::NoDoubleFinish)
        } else {
            None
        };

        if let Some(reason) = bust {
            self.bust(idx, reason);
            return ThrowOutcome::Bust { reason };
        }

        let remaining = candidate as u32;
        self.state.players[idx].score = remaining;
        if remaining == 0 {
            let darts = self.checkout(idx);
            return ThrowOutcome::Checkout { darts };
        }
        self.after_scoring_dart(idx, remaining)
    }

    /// Close the turn after its third dart, otherwise stay on the player.
    fn after_scoring_dart(&mut self, idx: usize, remaining: u32) -> ThrowOutcome {
        let player = &mut self.state.players[idx];
        if player.throws.len() < DARTS_PER_TURN {
            self.state.darts_thrown = player.throws.len();
            return ThrowOutcome::Scored { remaining };
        }
        let thrown = std::mem::take(&mut player.throws);
        tracing::debug!(player = %player.id, darts = ?thrown, remaining, "turn complete");
        player.history.push(TurnRecord::scored(thrown, TurnOutcome::Completed));
        player.recalculate_average();
        self.pass_turn();
        ThrowOutcome::TurnComplete { remaining }
    }

    /// Void the whole turn and move on.
    fn bust(&mut self, idx: usize, reason: BustReason) {
        let player = &mut self.state.players[idx];
        let thrown = std::mem::take(&mut player.throws);
        tracing::debug!(player = %player.id, darts = ?thrown, reason = reason.as_str(), "bust");
        player.history.push(TurnRecord::bust(thrown, reason));
        player.score = player.initial_score.saturating_sub(player.history_total());
        player.recalculate_average();
        self.pass_turn();
    }

    /// Record the win for `idx`. Play stays on the winner.
    fn checkout(&mut self, idx: usize) -> Vec<u32> {
        let round = self.state.round;
        let player = &mut self.state.players[idx];
        let thrown = std::mem::take(&mut player.throws);
        player.checkout = Some(thrown.clone());
        player.turn_count = round;
        player.history.push(TurnRecord::scored(thrown.clone(), TurnOutcome::Checkout));
        player.recalculate_average();
        tracing::info!(
            player = %player.id,
            name = %player.name,
            checkout = ?thrown,
            turns = round,
            "game won"
        );
        self.state.winner = Some(player.clone());
        self.state.phase = GamePhase::Over;
        self.state.darts_thrown = thrown.len();
        thrown
    }

    /// End the current player's turn early, zero-padding it to three darts.
    /// A turn with no darts is recorded as a pass and leaves the average alone.
    pub fn advance_turn(&mut self) -> bool {
        if !self.state.is_in_progress() || self.state.players.is_empty() {
            return false;
        }
        let idx = self.state.current_player_index;
        let player = &mut self.state.players[idx];
        let thrown = std::mem::take(&mut player.throws);
        tracing::debug!(player = %player.id, darts = ?thrown, "turn ended early");
        if thrown.is_empty() {
            player.history.push(TurnRecord::passed());
        } else {
            player.history.push(TurnRecord::scored(thrown, TurnOutcome::EndedEarly));
            player.recalculate_average();
        }
        self.pass_turn();
        true
    }

    fn pass_turn(&mut self) {
        let n = self.state.players.len();
        self.state.current_player_index = (self.state.current_player_index + 1) % n;
        if self.state.current_player_index == 0 {
            self.state.round += 1;
        }
        self.state.darts_thrown = 0;
    }

    // ------------------------------------------------------------------ //
    //  Undo
    // ------------------------------------------------------------------ //

    /// Take back the most recent dart.
    ///
    /// Within a turn the dart is popped and its value added back. At a turn
    /// boundary the previous player's last turn is reopened from its raw darts
    /// and the score is recomputed from the remaining history.
    pub fn undo_last_throw(&mut self) -> UndoOutcome {
        if self.state.players.is_empty() {
            return UndoOutcome::Nothing;
        }
        match self.state.phase {
            GamePhase::AwaitingStart => UndoOutcome::Nothing,
            GamePhase::Over => self.undo_checkout(),
            GamePhase::InProgress => {
                let idx = self.state.current_player_index;
                let countdown = self.state.game_type.is_countdown();
                let player = &mut self.state.players[idx];
                if let Some(value) = player.throws.pop() {
                    if countdown {
                        player.score += value;
                    }
                    self.state.darts_thrown = player.throws.len();
                    tracing::debug!(player = %player.id, value, "undo within turn");
                    return UndoOutcome::WithinTurn { value };
                }
                self.undo_across_turn()
            }
        }
    }

    fn undo_across_turn(&mut self) -> UndoOutcome {
        let n = self.state.players.len();
        let current = self.state.current_player_index;
        let crosses_round = current == 0;
        if crosses_round && self.state.round <= 1 {
            return UndoOutcome::Nothing;
        }
        let prev = if current == 0 { n - 1 } else { current - 1 };

        let player = &mut self.state.players[prev];
        let Some(record) = player.history.pop() else {
            return UndoOutcome::Nothing;
        };
        let mut throws = record.thrown.clone();
        if record.closed_by_dart() {
            throws.pop();
        }
        let pending: u32 = throws.iter().sum();
        player.score = player
            .initial_score
            .saturating_sub(player.history_total())
            .saturating_sub(pending);
        player.throws = throws;
        player.recalculate_average();
        tracing::debug!(player = %player.id, reopened = ?record.thrown, "undo across turn");

        self.state.darts_thrown = self.state.players[prev].throws.len();
        self.state.current_player_index = prev;
        if crosses_round {
            self.state.round = self.state.round.saturating_sub(1).max(1);
        }
        UndoOutcome::ReopenedTurn { player_index: prev }
    }

    fn undo_checkout(&mut self) -> UndoOutcome {
        let idx = self.state.current_player_index;
        let Some(player) = self.state.players.get_mut(idx) else {
            return UndoOutcome::Nothing;
        };
        if !matches!(player.history.last(), Some(r) if r.outcome == TurnOutcome::Checkout) {
            return UndoOutcome::Nothing;
        }
        let Some(record) = player.history.pop() else {
            return UndoOutcome::Nothing;
        };
        let mut throws = record.thrown;
        throws.pop();
        let pending: u32 = throws.iter().sum();
        player.score = player
            .initial_score
            .saturating_sub(player.history_total())
            .saturating_sub(pending);
        player.throws = throws;
        player.checkout = None;
        player.turn_count = 0;
        player.recalculate_average();
        tracing::info!(player = %player.id, "winning dart undone");

        self.state.darts_thrown = self.state.players[idx].throws.len();
        self.state.winner = None;
        self.state.phase = GamePhase::InProgress;
        UndoOutcome::ReopenedCheckout
    }
}
