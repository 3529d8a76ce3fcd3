//! Dartboard segments, dart notation and throw-value validation.
//!
//! This is the input boundary: everything that reaches
//! [`TurnEngine::record_throw`](crate::engine::turn_engine::TurnEngine::record_throw)
//! from a keyboard, a quick-pick button or a detector goes through
//! [`validate_throw_value`] or [`parse_throw`] first. The engine itself never
//! rejects a value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outer bull (single bull).
pub const OUTER_BULL: u32 = 25;
/// Inner bull (double bull).
pub const BULLSEYE: u32 = 50;
/// Highest score a single dart can make.
pub const MAX_DART_VALUE: u32 = 60;

/// Board numbers clockwise from the top.
pub const BOARD_ORDER: [u8; 20] = [20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid throw value '{input}': {reason}")]
    InvalidThrowValue { input: String, reason: &'static str },
    #[error("invalid segment {number}x{multiplier}")]
    InvalidSegment { number: u8, multiplier: u8 },
}

/// A single dart as a board segment. `number` 0 is a miss, 25 is the bull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dart {
    pub number: u8,
    pub multiplier: u8,
}

impl Dart {
    pub const MISS: Dart = Dart { number: 0, multiplier: 1 };

    pub fn new(number: u8, multiplier: u8) -> Result<Self, InputError> {
        let ok = match number {
            0 => multiplier == 1,
            1..=20 => (1..=3).contains(&multiplier),
            25 => (1..=2).contains(&multiplier),
            _ => false,
        };
        if ok {
            Ok(Self { number, multiplier })
        } else {
            Err(InputError::InvalidSegment { number, multiplier })
        }
    }

    pub fn single(number: u8) -> Self {
        Self { number, multiplier: 1 }
    }

    pub fn double(number: u8) -> Self {
        Self { number, multiplier: 2 }
    }

    pub fn triple(number: u8) -> Self {
        Self { number, multiplier: 3 }
    }

    pub fn bull() -> Self {
        Self { number: 25, multiplier: 2 }
    }

    pub fn value(&self) -> u32 {
        self.number as u32 * self.multiplier as u32
    }

    pub fn is_double(&self) -> bool {
        self.multiplier == 2 && self.number != 0
    }

    /// Display label: "20", "D20", "T20", "25", "Bull", "Miss".
    pub fn label(&self) -> String {
        match (self.number, self.multiplier) {
            (0, _) => "Miss".into(),
            (25, 1) => "25".into(),
            (25, _) => "Bull".into(),
            (n, 2) => format!("D{n}"),
            (n, 3) => format!("T{n}"),
            (n, _) => format!("{n}"),
        }
    }

    /// Label used inside checkout routes, where singles carry an `S`.
    pub fn route_label(&self) -> String {
        match (self.number, self.multiplier) {
            (n, 1) if (1..=20).contains(&n) => format!("S{n}"),
            _ => self.label(),
        }
    }
}

/// Parse dart notation such as `T20`, `d16`, `S5`, `25`, `Bull` or `Miss`.
pub fn parse_dart(s: &str) -> Result<Dart, InputError> {
    let raw = s.trim();
    let upper = raw.to_uppercase();
    let invalid = |reason| InputError::InvalidThrowValue {
        input: raw.to_string(),
        reason,
    };

    match upper.as_str() {
        "" => return Err(invalid("empty input")),
        "MISS" | "M" | "0" => return Ok(Dart::MISS),
        "BULL" | "DB" | "BE" | "D25" => return Ok(Dart::bull()),
        "25" | "OB" | "SB" | "S25" => return Ok(Dart::single(25)),
        _ => {}
    }

    let (multiplier, digits) = match upper.chars().next() {
        Some('S') => (1, &upper[1..]),
        Some('D') => (2, &upper[1..]),
        Some('T') => (3, &upper[1..]),
        _ => (1, upper.as_str()),
    };
    let number: u8 = digits
        .parse()
        .map_err(|_| invalid("not a dart segment"))?;
    if !(1..=20).contains(&number) {
        return Err(invalid("segment must be 1-20, 25 or Bull"));
    }
    Dart::new(number, multiplier)
}

/// True when a single dart can score exactly `value`.
pub fn is_reachable_value(value: u32) -> bool {
    match value {
        0..=20 | OUTER_BULL | BULLSEYE => true,
        21..=MAX_DART_VALUE => (value % 2 == 0 && value <= 40) || value % 3 == 0,
        _ => false,
    }
}

/// Validate a throw value at the boundary. A throw is one dart, so the value
/// must be one a single dart can score.
pub fn validate_throw_value(value: u32) -> Result<u32, InputError> {
    if value > MAX_DART_VALUE {
        return Err(InputError::InvalidThrowValue {
            input: value.to_string(),
            reason: "a single dart scores at most 60",
        });
    }
    if !is_reachable_value(value) {
        return Err(InputError::InvalidThrowValue {
            input: value.to_string(),
            reason: "no single dart scores this value",
        });
    }
    Ok(value)
}

/// One validated throw as it reaches the engine.
///
/// A bare value carries no ring, so a finish on it is judged by value. A
/// dart knows whether it hit the double ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throw {
    Value(u32),
    Dart(Dart),
}

impl Throw {
    pub fn value(&self) -> u32 {
        match self {
            Throw::Value(v) => *v,
            Throw::Dart(d) => d.value(),
        }
    }
}

/// Parse user input into a validated throw.
///
/// Purely numeric input is a throw value; anything else is dart notation.
pub fn parse_input(s: &str) -> Result<Throw, InputError> {
    let raw = s.trim();
    if raw.starts_with('-') {
        return Err(InputError::InvalidThrowValue {
            input: raw.to_string(),
            reason: "throw values cannot be negative",
        });
    }
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        let value: u32 = raw.parse().map_err(|_| InputError::InvalidThrowValue {
            input: raw.to_string(),
            reason: "number too large",
        })?;
        return validate_throw_value(value).map(Throw::Value);
    }
    parse_dart(raw).map(Throw::Dart)
}

/// [`parse_input`] reduced to the throw value.
pub fn parse_throw(s: &str) -> Result<u32, InputError> {
    parse_input(s).map(|t| t.value())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Single,
    Double,
    Triple,
    Outer,
    Bullseye,
    Miss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DartSection {
    pub value: u32,
    pub kind: SectionKind,
    pub label: String,
}

/// Every scoring section on the board, singles first.
pub fn all_dart_sections() -> Vec<DartSection> {
    let mut sections = Vec::with_capacity(63);
    for (kind, m) in [(SectionKind::Single, 1), (SectionKind::Double, 2), (SectionKind::Triple, 3)] {
        for n in 1..=20u8 {
            let dart = Dart { number: n, multiplier: m };
            sections.push(DartSection { value: dart.value(), kind, label: dart.label() });
        }
    }
    sections.push(DartSection { value: OUTER_BULL, kind: SectionKind::Outer, label: "25".into() });
    sections.push(DartSection { value: BULLSEYE, kind: SectionKind::Bullseye, label: "Bull".into() });
    sections.push(DartSection { value: 0, kind: SectionKind::Miss, label: "Miss".into() });
    sections
}

/// Numbers either side of `number` on the board.
pub fn board_neighbours(number: u8) -> Option<(u8, u8)> {
    let idx = BOARD_ORDER.iter().position(|&n| n == number)?;
    let left = BOARD_ORDER[(idx + BOARD_ORDER.len() - 1) % BOARD_ORDER.len()];
    let right = BOARD_ORDER[(idx + 1) % BOARD_ORDER.len()];
    Some((left, right))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickPick {
    pub value: u32,
    pub label: &'static str,
}

/// Common single-dart values offered as one-tap buttons.
pub const QUICK_PICKS: [QuickPick; 15] = [
    QuickPick { value: 60, label: "T20" },
    QuickPick { value: 57, label: "T19" },
    QuickPick { value: 54, label: "T18" },
    QuickPick { value: 51, label: "T17" },
    QuickPick { value: 50, label: "Bull" },
    QuickPick { value: 40, label: "D20" },
    QuickPick { value: 38, label: "D19" },
    QuickPick { value: 36, label: "D18" },
    QuickPick { value: 25, label: "25" },
    QuickPick { value: 20, label: "20" },
    QuickPick { value: 19, label: "19" },
    QuickPick { value: 18, label: "18" },
    QuickPick { value: 17, label: "17" },
    QuickPick { value: 16, label: "16" },
    QuickPick { value: 0, label: "Miss" },
];
