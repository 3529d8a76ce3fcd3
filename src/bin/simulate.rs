//! Simulate CLI: run seeded games between throw strategies.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --games 1000 --p1-accuracy 0.8 --p2-type random
//!   cargo run --release --bin simulate -- --games 200 --game-type 301 --single-out

use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dartify_engine::detector::simulated::{build_strategy, ThrowStrategy};
use dartify_engine::engine::arena::{run_arena, ArenaConfig};
use dartify_engine::engine::config::StrategyKind;
use dartify_engine::engine::models::{GameOptions, GameType};

#[derive(Parser)]
#[command(name = "simulate", about = "Run simulated dart games between throw strategies")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42", env = "DARTIFY_SEED")]
    seed: u64,

    /// "501", "301" or "cricket"
    #[arg(long, default_value = "501")]
    game_type: String,

    /// Finish on any dart instead of a double
    #[arg(long)]
    single_out: bool,

    /// Stop unfinished games after this many rounds
    #[arg(long, default_value = "50")]
    max_rounds: u32,

    /// Alternate who throws first between games
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// P1 display name
    #[arg(long, default_value = "p1")]
    p1_name: String,

    /// P1 strategy: "checkout" or "random"
    #[arg(long, default_value = "checkout")]
    p1_type: String,

    /// P1 hit probability
    #[arg(long, default_value = "0.6")]
    p1_accuracy: f64,

    /// P2 display name
    #[arg(long, default_value = "p2")]
    p2_name: String,

    /// P2 strategy: "checkout" or "random"
    #[arg(long, default_value = "checkout")]
    p2_type: String,

    /// P2 hit probability
    #[arg(long, default_value = "0.4")]
    p2_accuracy: f64,
}

fn strategy(name: &str, kind: &str, accuracy: f64) -> Result<(String, Box<dyn ThrowStrategy>), String> {
    let kind = StrategyKind::from_str(kind).ok_or_else(|| format!("unknown strategy '{}'", kind))?;
    if !(0.0..=1.0).contains(&accuracy) {
        return Err(format!("accuracy for {} must be between 0 and 1", name));
    }
    Ok((name.to_string(), build_strategy(kind, accuracy)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();

    let game_type = GameType::from_str(&cli.game_type)
        .ok_or_else(|| format!("unknown game type '{}'", cli.game_type))?;
    if cli.p1_name == cli.p2_name {
        return Err("player names must differ".into());
    }
    let strategies = vec![
        strategy(&cli.p1_name, &cli.p1_type, cli.p1_accuracy)?,
        strategy(&cli.p2_name, &cli.p2_type, cli.p2_accuracy)?,
    ];

    let config = ArenaConfig {
        num_games: cli.games,
        base_seed: cli.seed,
        game_type,
        options: GameOptions { double_out: !cli.single_out },
        max_rounds: cli.max_rounds,
        alternate_seats: cli.alternate_seats,
    };

    eprintln!(
        "Simulate: {} games of {}, seed={}, max_rounds={}, alternate_seats={}",
        cli.games, game_type, cli.seed, cli.max_rounds, cli.alternate_seats
    );
    for (name, s) in &strategies {
        eprintln!("  {}: type={}", name, s.name());
    }
    eprintln!();

    let printed = AtomicUsize::new(0);
    let total = cli.games;
    let progress_cb = |done: usize, _total: usize| {
        // Progress arrives out of order from worker threads.
        if printed.fetch_max(done, Ordering::Relaxed) < done {
            eprint!("\r  [{}/{}] games completed", done, total);
        }
    };

    let result = run_arena(&strategies, &config, Some(&progress_cb));

    eprintln!("\r                                    ");
    println!("{}", result.summary());
    Ok(())
}
