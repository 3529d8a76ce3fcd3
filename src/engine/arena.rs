//! Strategy-vs-strategy arena runner over the turn engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::detector::simulated::ThrowStrategy;
use crate::engine::models::{GameOptions, GameType, ThrowOutcome};
use crate::engine::turn_engine::TurnEngine;

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub num_games: usize,
    pub base_seed: u64,
    pub game_type: GameType,
    pub options: GameOptions,
    /// Games still open after this many rounds count as unfinished.
    pub max_rounds: u32,
    pub alternate_seats: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            num_games: 100,
            base_seed: 42,
            game_type: GameType::X501,
            options: GameOptions::default(),
            max_rounds: 50,
            alternate_seats: true,
        }
    }
}

/// Aggregated results from an arena run.
#[derive(Debug, Clone)]
pub struct ArenaResult {
    pub num_games: usize,
    /// Strategy names in the order they were given.
    pub names: Vec<String>,
    pub wins: HashMap<String, usize>,
    pub unfinished: usize,
    pub darts_to_finish: HashMap<String, Vec<usize>>,
    pub averages: HashMap<String, Vec<f64>>,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn mean_darts_to_finish(&self, name: &str) -> Option<f64> {
        match self.darts_to_finish.get(name) {
            Some(d) if !d.is_empty() => Some(d.iter().sum::<usize>() as f64 / d.len() as f64),
            _ => None,
        }
    }

    pub fn mean_average(&self, name: &str) -> f64 {
        match self.averages.get(name) {
            Some(a) if !a.is_empty() => a.iter().sum::<f64>() / a.len() as f64,
            _ => 0.0,
        }
    }

    /// Wilson score interval for the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for name in &self.names {
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            let darts = self
                .mean_darts_to_finish(name)
                .map(|d| format!("{:5.1}", d))
                .unwrap_or_else(|| "    -".into());
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]  darts={}  avg={:5.1}",
                name,
                self.wins.get(name).copied().unwrap_or(0),
                self.win_rate(name) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
                darts,
                self.mean_average(name),
            ));
        }
        lines.push(format!("  {:>12}: {}", "Unfinished", self.unfinished));
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!("  Avg game: {:.2}ms  |  Total: {:.2}s", avg_ms, total_ms / 1000.0));
        }
        lines.join("\n")
    }
}

/// One finished (or abandoned) arena game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Strategy name per seat.
    pub seats: Vec<String>,
    pub winner: Option<String>,
    pub winner_darts: usize,
    /// Final 3-dart average per seat.
    pub averages: Vec<f64>,
    pub rounds: u32,
}

/// Play one seeded game with `seats[i]` throwing for player `i`.
pub fn play_one_game(
    seats: &[(&str, &dyn ThrowStrategy)],
    game_type: GameType,
    options: GameOptions,
    max_rounds: u32,
    seed: u64,
) -> GameRecord {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut engine = TurnEngine::with_game(game_type, options);
    for (name, _) in seats {
        engine.add_player(name);
    }
    engine.start_game(game_type, options);

    let mut winner_seat = None;
    while engine.state().is_in_progress() && engine.state().round <= max_rounds {
        let idx = engine.state().current_player_index;
        let Some(player) = engine.state().current_player() else {
            break;
        };
        let dart = seats[idx].1.throw_dart(player.score, options.double_out, &mut rng);
        if let ThrowOutcome::Checkout { .. } = engine.record_dart(dart) {
            winner_seat = Some(idx);
        }
    }

    let state = engine.state();
    let winner_darts = winner_seat
        .and_then(|i| state.players.get(i))
        .map(|p| p.history.iter().map(|t| t.thrown.len()).sum())
        .unwrap_or(0);
    GameRecord {
        seats: seats.iter().map(|(n, _)| n.to_string()).collect(),
        winner: winner_seat.map(|i| seats[i].0.to_string()),
        winner_darts,
        averages: state.players.iter().map(|p| p.average).collect(),
        rounds: state.round,
    }
}

/// Run `config.num_games` between the given strategies in parallel and
/// return aggregated stats.
pub fn run_arena(
    strategies: &[(String, Box<dyn ThrowStrategy>)],
    config: &ArenaConfig,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    let names: Vec<String> = strategies.iter().map(|(n, _)| n.clone()).collect();
    let num_players = strategies.len();
    let completed = AtomicUsize::new(0);

    let games: Vec<(GameRecord, f64)> = (0..config.num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seats: Vec<(&str, &dyn ThrowStrategy)> = (0..num_players)
                .map(|i| {
                    let j = if config.alternate_seats { (i + game_idx) % num_players } else { i };
                    (strategies[j].0.as_str(), strategies[j].1.as_ref())
                })
                .collect();
            let t0 = Instant::now();
            let record = play_one_game(
                &seats,
                config.game_type,
                config.options,
                config.max_rounds,
                config.base_seed + game_idx as u64,
            );
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, config.num_games);
            }
            (record, elapsed_ms)
        })
        .collect();

    let mut result = ArenaResult {
        num_games: config.num_games,
        names: names.clone(),
        wins: names.iter().map(|n| (n.clone(), 0)).collect(),
        unfinished: 0,
        darts_to_finish: names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        averages: names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        game_durations_ms: Vec::with_capacity(games.len()),
    };

    for (record, elapsed_ms) in games {
        result.game_durations_ms.push(elapsed_ms);
        for (seat, avg) in record.seats.iter().zip(&record.averages) {
            if let Some(a) = result.averages.get_mut(seat) {
                a.push(*avg);
            }
        }
        match record.winner {
            Some(name) => {
                *result.wins.entry(name.clone()).or_insert(0) += 1;
                result.darts_to_finish.entry(name).or_default().push(record.winner_darts);
            }
            None => result.unfinished += 1,
        }
    }

    tracing::info!(
        games = result.num_games,
        unfinished = result.unfinished,
        "arena run complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::simulated::{CheckoutThrower, RandomThrower};

    fn strategies() -> Vec<(String, Box<dyn ThrowStrategy>)> {
        vec![
            ("sharp".to_string(), Box::new(CheckoutThrower::new(0.9)) as Box<dyn ThrowStrategy>),
            ("random".to_string(), Box::new(RandomThrower)),
        ]
    }

    #[test]
    fn test_perfect_thrower_finishes_in_nine() {
        let perfect = CheckoutThrower::new(1.0);
        let seats: Vec<(&str, &dyn ThrowStrategy)> = vec![("perfect", &perfect)];
        let record = play_one_game(&seats, GameType::X501, GameOptions::default(), 50, 7);
        assert_eq!(record.winner.as_deref(), Some("perfect"));
        assert_eq!(record.winner_darts, 9);
    }

    #[test]
    fn test_max_rounds_caps_game() {
        let hopeless = CheckoutThrower::new(0.0);
        let seats: Vec<(&str, &dyn ThrowStrategy)> = vec![("a", &hopeless), ("b", &hopeless)];
        let record = play_one_game(&seats, GameType::Cricket, GameOptions::default(), 3, 1);
        assert!(record.winner.is_none());
        assert_eq!(record.rounds, 4);
    }

    #[test]
    fn test_arena_is_reproducible() {
        let config = ArenaConfig { num_games: 12, ..ArenaConfig::default() };
        let a = run_arena(&strategies(), &config, None);
        let b = run_arena(&strategies(), &config, None);
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.unfinished, b.unfinished);
        let total: usize = a.wins.values().sum::<usize>() + a.unfinished;
        assert_eq!(total, 12);
        assert_eq!(a.game_durations_ms.len(), 12);
    }

    #[test]
    fn test_accurate_thrower_dominates() {
        let config = ArenaConfig { num_games: 20, ..ArenaConfig::default() };
        let result = run_arena(&strategies(), &config, None);
        assert!(result.win_rate("sharp") > result.win_rate("random"));
        assert!(result.mean_average("sharp") > result.mean_average("random"));
        assert!(result.summary().contains("sharp"));
    }
}
