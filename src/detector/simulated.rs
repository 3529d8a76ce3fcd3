//! Simulated throw sources: strategies that pick where a dart lands, and a
//! detector that wraps them in backend-shaped score frames.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::detector::protocol::{DartThrow, ScoreResult, ScoringSection};
use crate::engine::config::{DetectorConfig, StrategyKind};
use crate::games::x01::board::{board_neighbours, Dart, BOARD_ORDER};
use crate::games::x01::checkout::checkout_route;

/// Multiplier weights of the placeholder detector: singles four times as
/// likely as triples, doubles twice.
const MULTIPLIER_WEIGHTS: [u8; 7] = [1, 1, 1, 1, 2, 2, 3];

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;
const BOARD_RADIUS: f64 = 200.0;

/// A source of darts. `score` is what the thrower has left.
pub trait ThrowStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn throw_dart(&self, score: u32, double_out: bool, rng: &mut StdRng) -> Dart;
}

/// Uniform section 1-20 with weighted multipliers; ignores the score.
pub struct RandomThrower;

impl ThrowStrategy for RandomThrower {
    fn name(&self) -> &str {
        "random"
    }

    fn throw_dart(&self, _score: u32, _double_out: bool, rng: &mut StdRng) -> Dart {
        let number = rng.gen_range(1..=20u8);
        let multiplier = *MULTIPLIER_WEIGHTS.choose(rng).unwrap_or(&1);
        Dart { number, multiplier }
    }
}

/// Aims at the suggested first dart of a finish when one exists, otherwise
/// at treble 20. Hits with probability `accuracy`.
pub struct CheckoutThrower {
    pub accuracy: f64,
}

impl CheckoutThrower {
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy: accuracy.clamp(0.0, 1.0) }
    }

    pub fn aim(&self, score: u32, double_out: bool) -> Dart {
        checkout_route(score, double_out)
            .and_then(|route| route.first().copied())
            .unwrap_or(Dart::triple(20))
    }
}

impl ThrowStrategy for CheckoutThrower {
    fn name(&self) -> &str {
        "checkout"
    }

    fn throw_dart(&self, score: u32, double_out: bool, rng: &mut StdRng) -> Dart {
        let target = self.aim(score, double_out);
        if rng.gen_bool(self.accuracy.clamp(0.0, 1.0)) {
            return target;
        }
        scatter(target, rng)
    }
}

/// Where a missed dart ends up: the single of the aimed number half the
/// time, otherwise the single of a neighbouring number.
fn scatter(target: Dart, rng: &mut StdRng) -> Dart {
    if target.number == 25 {
        return if rng.gen_bool(0.5) {
            Dart::single(25)
        } else {
            Dart::single(BOARD_ORDER[rng.gen_range(0..BOARD_ORDER.len())])
        };
    }
    match board_neighbours(target.number) {
        Some((left, right)) => match rng.gen_range(0..4) {
            0 => Dart::single(left),
            1 => Dart::single(right),
            _ => Dart::single(target.number),
        },
        None => Dart::MISS,
    }
}

pub fn build_strategy(kind: StrategyKind, accuracy: f64) -> Box<dyn ThrowStrategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomThrower),
        StrategyKind::Checkout => Box::new(CheckoutThrower::new(accuracy)),
    }
}

/// Backend encoding of a dart: inner bull as 50 ×1, miss as 0 ×0.
pub fn section_for(dart: Dart) -> ScoringSection {
    match (dart.number, dart.multiplier) {
        (0, _) => ScoringSection::miss(),
        (25, 2) => ScoringSection::bull(),
        (25, _) => ScoringSection::outer_bull(),
        (n, m) => ScoringSection {
            number: n as u32,
            multiplier: m as u32,
            label: dart.label(),
        },
    }
}

/// Pixel position of a dart on a 640x480 frame with the board centred.
fn frame_position(dart: Dart) -> (f64, f64) {
    let cx = FRAME_WIDTH as f64 / 2.0;
    let cy = FRAME_HEIGHT as f64 / 2.0;
    let ring = match (dart.number, dart.multiplier) {
        (0, _) => 1.1,
        (25, 2) => 0.0,
        (25, _) => 0.06,
        (_, 3) => 0.6,
        (_, 2) => 0.97,
        _ => 0.8,
    };
    let idx = BOARD_ORDER.iter().position(|&n| n == dart.number).unwrap_or(0);
    let angle = (idx as f64 * 18.0).to_radians();
    let r = ring * BOARD_RADIUS;
    (cx + r * angle.sin(), cy - r * angle.cos())
}

/// Produces one score frame per call, as the camera backend would.
pub struct SimulatedDetector {
    strategy: Box<dyn ThrowStrategy>,
    rng: StdRng,
}

impl SimulatedDetector {
    pub fn new(strategy: Box<dyn ThrowStrategy>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { strategy, rng }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(build_strategy(config.strategy, config.accuracy), config.seed)
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Detect one dart thrown by a player with `score` left.
    pub fn detect(&mut self, score: u32, double_out: bool) -> ScoreResult {
        let dart = self.strategy.throw_dart(score, double_out, &mut self.rng);
        let (x, y) = frame_position(dart);
        let section = section_for(dart);
        let total_score = section.value();
        ScoreResult {
            throws: vec![DartThrow {
                section,
                x,
                y,
                confidence: self.rng.gen_range(0.7..0.99),
            }],
            total_score,
            image_width: FRAME_WIDTH,
            image_height: FRAME_HEIGHT,
        }
    }
}
