//! Per-player statistics derived from turn history.

use serde::Serialize;

use crate::engine::models::{Player, TurnOutcome, DARTS_PER_TURN};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_id: String,
    pub name: String,
    pub total_darts: usize,
    pub total_score: u32,
    pub average: f64,
    pub highest_dart: u32,
    pub lowest_dart: u32,
    pub zero_darts: usize,
    pub miss_percentage: f64,
    pub best_turn: u32,
    pub tons: usize,
    pub ton_forties: usize,
    pub maximums: usize,
    pub busts: usize,
    pub checkout: Option<Vec<u32>>,
}

impl PlayerStats {
    pub fn from_player(player: &Player) -> Self {
        let darts: Vec<u32> = player.history_darts().collect();
        let total_darts = darts.len();
        let total_score: u32 = darts.iter().sum();
        let zero_darts = darts.iter().filter(|&&d| d == 0).count();

        let average = if total_darts == 0 {
            0.0
        } else {
            total_score as f64 / total_darts as f64 * DARTS_PER_TURN as f64
        };
        let miss_percentage = if total_darts == 0 {
            0.0
        } else {
            zero_darts as f64 / total_darts as f64 * 100.0
        };

        let turn_totals: Vec<u32> = player.scored_turns().map(|t| t.total()).collect();
        let count_at_least = |limit: u32| turn_totals.iter().filter(|&&t| t >= limit).count();

        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            total_darts,
            total_score,
            average,
            highest_dart: darts.iter().copied().max().unwrap_or(0),
            lowest_dart: darts.iter().copied().min().unwrap_or(0),
            zero_darts,
            miss_percentage,
            best_turn: turn_totals.iter().copied().max().unwrap_or(0),
            tons: count_at_least(100),
            ton_forties: count_at_least(140),
            maximums: turn_totals.iter().filter(|&&t| t == 180).count(),
            busts: player
                .history
                .iter()
                .filter(|t| matches!(t.outcome, TurnOutcome::Bust(_)))
                .count(),
            checkout: player.checkout.clone(),
        }
    }
}

/// Winner first, then by descending average. Equal averages keep turn order.
pub fn rank_players(players: &[Player], winner: Option<&Player>) -> Vec<PlayerStats> {
    let mut stats: Vec<PlayerStats> = players.iter().map(PlayerStats::from_player).collect();
    let winner_id = winner.map(|w| w.id.as_str());
    stats.sort_by(|a, b| {
        let a_won = Some(a.player_id.as_str()) == winner_id;
        let b_won = Some(b.player_id.as_str()) == winner_id;
        b_won
            .cmp(&a_won)
            .then_with(|| b.average.partial_cmp(&a.average).unwrap_or(std::cmp::Ordering::Equal))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::{BustReason, TurnRecord};

    fn player_with(id: &str, turns: &[&[u32]]) -> Player {
        let mut p = Player::new(id.into(), id, 501);
        for t in turns {
            p.history.push(TurnRecord::scored(t.to_vec(), TurnOutcome::Completed));
        }
        p.recalculate_average();
        p
    }

    #[test]
    fn test_stats_over_history() {
        let mut p = player_with("p1", &[&[60, 60, 60], &[20, 0, 5], &[60, 60, 20]]);
        p.history.push(TurnRecord::bust(vec![60, 60], BustReason::Overshoot));
        let s = PlayerStats::from_player(&p);
        assert_eq!(s.total_darts, 12);
        assert_eq!(s.total_score, 345);
        assert!((s.average - 86.25).abs() < 1e-9);
        assert_eq!(s.highest_dart, 60);
        assert_eq!(s.lowest_dart, 0);
        assert_eq!(s.zero_darts, 4);
        assert!((s.miss_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.best_turn, 180);
        assert_eq!(s.tons, 2);
        assert_eq!(s.ton_forties, 2);
        assert_eq!(s.maximums, 1);
        assert_eq!(s.busts, 1);
    }

    #[test]
    fn test_passes_are_not_counted() {
        let mut p = player_with("p1", &[&[60, 60, 60]]);
        p.history.push(TurnRecord::passed());
        let s = PlayerStats::from_player(&p);
        assert_eq!(s.total_darts, 3);
        assert_eq!(s.zero_darts, 0);
        assert!((s.average - 180.0).abs() < 1e-9);
        assert_eq!(s.miss_percentage, 0.0);
    }

    #[test]
    fn test_empty_history() {
        let s = PlayerStats::from_player(&Player::new("p1".into(), "A", 501));
        assert_eq!(s.total_darts, 0);
        assert_eq!(s.average, 0.0);
        assert_eq!(s.miss_percentage, 0.0);
        assert_eq!(s.highest_dart, 0);
    }

    #[test]
    fn test_rank_winner_first() {
        let strong = player_with("p1", &[&[60, 60, 60]]);
        let weak = player_with("p2", &[&[1, 1, 1]]);
        let mid = player_with("p3", &[&[20, 20, 20]]);
        let players = vec![strong.clone(), weak.clone(), mid];

        let ranked = rank_players(&players, Some(&weak));
        let order: Vec<&str> = ranked.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1", "p3"]);

        let ranked = rank_players(&players, None);
        assert_eq!(ranked[0].player_id, "p1");
        assert_eq!(ranked[2].player_id, "p2");
    }
}
