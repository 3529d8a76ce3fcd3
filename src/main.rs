use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use dartify_engine::detector::feed::DetectorFeed;
use dartify_engine::detector::protocol::StreamMessage;
use dartify_engine::detector::simulated::SimulatedDetector;
use dartify_engine::engine::config::{load_config, load_default_config, DartifyConfig, StrategyKind};
use dartify_engine::games::x01::checkout::{all_checkout_options, points_until_checkout, suggest_checkout};
use dartify_engine::session::{Reply, Session, HELP};

#[derive(Parser)]
#[command(name = "dartify", about = "Dart scoring for 501, 301 and Cricket")]
struct Cli {
    /// Path to dartify.toml (default: auto-discover)
    #[arg(long, global = true, env = "DARTIFY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive scoring session on stdin
    Play {
        /// Feed simulated camera detections into the game
        #[arg(long, env = "DARTIFY_DETECTOR")]
        detector: bool,

        /// Milliseconds between simulated detections
        #[arg(long, env = "DARTIFY_DETECTOR_INTERVAL_MS")]
        interval_ms: Option<u64>,

        /// Detector random seed
        #[arg(long, env = "DARTIFY_DETECTOR_SEED")]
        seed: Option<u64>,

        /// Detector strategy: "checkout" or "random"
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Print the checkout route for a score
    Checkout {
        score: u32,

        /// Finish on any dart instead of a double
        #[arg(long)]
        single_out: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| format!("Failed to load config: {}", e))?,
        None => load_default_config(),
    };

    match cli.command {
        Command::Checkout { score, single_out } => {
            print_checkout(score, !single_out);
            Ok(())
        }
        Command::Play { detector, interval_ms, seed, strategy } => {
            if detector {
                config.detector.enabled = true;
            }
            if let Some(ms) = interval_ms {
                config.detector.interval_ms = ms.max(1);
            }
            if seed.is_some() {
                config.detector.seed = seed;
            }
            if let Some(s) = strategy {
                config.detector.strategy = StrategyKind::from_str(&s)
                    .ok_or_else(|| format!("unknown detector strategy '{}'", s))?;
            }
            play(config).await
        }
    }
}

fn print_checkout(score: u32, double_out: bool) {
    let suggestion = suggest_checkout(score, double_out);
    match suggestion.sequence_label {
        Some(route) => {
            println!("{}: {}", score, route);
            for option in all_checkout_options(score, double_out) {
                println!("  {}", option.label);
            }
        }
        None => match points_until_checkout(score) {
            Some(p) => println!("{}: {} points until possible checkout", score, p),
            None => println!("{}: no checkout", score),
        },
    }
}

fn spawn_feed(config: &DartifyConfig) -> DetectorFeed {
    let detector = SimulatedDetector::from_config(&config.detector);
    DetectorFeed::spawn(detector, Duration::from_millis(config.detector.interval_ms))
}

/// Next detector frame, or never when the feed is off.
async fn next_frame(feed: &mut Option<DetectorFeed>) -> Option<StreamMessage> {
    match feed {
        Some(f) => f.frames.recv().await,
        None => std::future::pending().await,
    }
}

async fn play(config: DartifyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::from_config(&config);
    let mut feed = config.detector.enabled.then(|| spawn_feed(&config));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    println!("{}", session.render());

    loop {
        if let Some(f) = &feed {
            f.aim(session.aim_target());
        }
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match session.handle_line(&line) {
                    Reply::Quit => break,
                    Reply::Camera(true) => {
                        if feed.is_none() {
                            feed = Some(spawn_feed(&config));
                        }
                        println!("camera on");
                    }
                    Reply::Camera(false) => {
                        if let Some(f) = feed.take() {
                            f.stop();
                        }
                        println!("camera off");
                    }
                    reply => println!("{}", reply),
                }
            }
            frame = next_frame(&mut feed) => {
                match frame {
                    Some(msg) => {
                        for reply in session.apply_frame(&msg) {
                            println!("[camera] {}", reply);
                        }
                    }
                    None => {
                        tracing::warn!("detector feed closed");
                        feed = None;
                    }
                }
            }
        }
    }
    Ok(())
}
