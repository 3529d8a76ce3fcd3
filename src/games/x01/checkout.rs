//! Checkout rules for 01-style countdown games.
//!
//! Pure functions: range checks, double detection and finishing-route hints.
//! The turn engine consults [`is_double`] for legality; the route helpers are
//! advisory and only feed hints to the UI.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use super::board::{all_dart_sections, parse_dart, Dart, BULLSEYE, OUTER_BULL};

/// Highest score that can be finished in one turn.
pub const MAX_CHECKOUT: u32 = 170;

/// Upper bound of the "points until a possible checkout" hint.
const APPROACH_LIMIT: u32 = 230;

/// Cap on alternative first darts offered by [`all_checkout_options`].
const MAX_OPTIONS: usize = 4;

/// Preferred double-out routes, 2..=170. Scores missing here cannot be
/// finished with a double.
static ROUTES: &[(u32, &str)] = &[
    (170, "T20 T20 Bull"), (167, "T20 T19 Bull"), (164, "T20 T18 Bull"), (161, "T20 T17 Bull"),
    (160, "T20 T20 D20"), (158, "T20 T20 D19"), (157, "T20 T19 D20"), (156, "T20 T20 D18"),
    (155, "T20 T19 D19"), (154, "T20 T18 D20"), (153, "T20 T19 D18"), (152, "T20 T20 D16"),
    (151, "T20 T17 D20"), (150, "T20 T18 D18"), (149, "T20 T19 D16"), (148, "T20 T20 D14"),
    (147, "T20 T17 D18"), (146, "T20 T18 D16"), (145, "T20 T19 D14"), (144, "T20 T20 D12"),
    (143, "T20 T17 D16"), (142, "T20 T14 D20"), (141, "T20 T19 D12"), (140, "T20 T20 D10"),
    (139, "T20 T13 D20"), (138, "T20 T18 D12"), (137, "T20 T19 D10"), (136, "T20 T20 D8"),
    (135, "T20 T15 D15"), (134, "T20 T14 D16"), (133, "T20 T19 D8"), (132, "T20 T16 D12"),
    (131, "T20 T13 D16"), (130, "T20 T18 D8"), (129, "T19 T16 D12"), (128, "T18 T18 D10"),
    (127, "T20 T17 D8"), (126, "T19 T19 D6"), (125, "T20 T19 D4"), (124, "T20 T16 D8"),
    (123, "T19 T18 D6"), (122, "T18 T18 D7"), (121, "T20 T11 D14"), (120, "T20 S20 D20"),
    (119, "T19 T12 D13"), (118, "T20 S18 D20"), (117, "T20 S17 D20"), (116, "T20 S16 D20"),
    (115, "T19 S18 D20"), (114, "T20 S14 D20"), (113, "T19 S16 D20"), (112, "T20 S12 D20"),
    (111, "T19 S14 D20"), (110, "T20 S10 D20"), (109, "T19 S12 D20"), (108, "T20 S8 D20"),
    (107, "T19 S10 D20"), (106, "T20 S6 D20"), (105, "T19 S8 D20"), (104, "T18 S18 D16"),
    (103, "T19 S10 D18"), (102, "T20 S10 D16"), (101, "T17 S10 D20"), (100, "T20 D20"),
    (99, "T19 S10 D16"), (98, "T20 D19"), (97, "T19 D20"), (96, "T20 D18"), (95, "T19 D19"),
    (94, "T18 D20"), (93, "T19 D18"), (92, "T20 D16"), (91, "T17 D20"), (90, "T20 D15"),
    (89, "T19 D16"), (88, "T20 D14"), (87, "T17 D18"), (86, "T18 D16"), (85, "T15 D20"),
    (84, "T20 D12"), (83, "T17 D16"), (82, "T14 D20"), (81, "T19 D12"), (80, "T20 D10"),
    (79, "T19 D11"), (78, "T18 D12"), (77, "T19 D10"), (76, "T20 D8"), (75, "T17 D12"),
    (74, "T14 D16"), (73, "T19 D8"), (72, "T16 D12"), (71, "T13 D16"), (70, "T18 D8"),
    (69, "T19 D6"), (68, "T20 D4"), (67, "T17 D8"), (66, "T10 D18"), (65, "T19 D4"),
    (64, "T16 D8"), (63, "T13 D12"), (62, "T10 D16"), (61, "T15 D8"), (60, "S20 D20"),
    (59, "S19 D20"), (58, "S18 D20"), (57, "S17 D20"), (56, "S16 D20"), (55, "S15 D20"),
    (54, "S14 D20"), (53, "S13 D20"), (52, "S12 D20"), (51, "S11 D20"), (50, "Bull"),
    (49, "S9 D20"), (48, "S16 D16"), (47, "S15 D16"), (46, "S6 D20"), (45, "S13 D16"),
    (44, "S12 D16"), (43, "S11 D16"), (42, "S10 D16"), (41, "S9 D16"), (40, "D20"),
    (39, "S7 D16"), (38, "D19"), (37, "S5 D16"), (36, "D18"), (35, "S3 D16"), (34, "D17"),
    (33, "S1 D16"), (32, "D16"), (31, "S15 D8"), (30, "D15"), (29, "S13 D8"), (28, "D14"),
    (27, "S11 D8"), (26, "D13"), (25, "S9 D8"), (24, "D12"), (23, "S7 D8"), (22, "D11"),
    (21, "S5 D8"), (20, "D10"), (19, "S3 D8"), (18, "D9"), (17, "S1 D8"), (16, "D8"),
    (15, "S7 D4"), (14, "D7"), (13, "S5 D4"), (12, "D6"), (11, "S3 D4"), (10, "D5"),
    (9, "S1 D4"), (8, "D4"), (7, "S3 D2"), (6, "D3"), (5, "S1 D2"), (4, "D2"), (3, "S1 D1"),
    (2, "D1"),
];

pub static CHECKOUT_TABLE: Lazy<HashMap<u32, &'static str>> =
    Lazy::new(|| ROUTES.iter().copied().collect());

/// Distinct single-dart scores, highest first.
static DART_VALUES_DESC: Lazy<Vec<u32>> = Lazy::new(|| {
    let mut values: Vec<u32> = all_dart_sections()
        .into_iter()
        .map(|s| s.value)
        .filter(|&v| v > 0)
        .collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();
    values
});

/// True for the bullseye and for every double ring value (D1..D20).
pub fn is_double(value: u32) -> bool {
    value == BULLSEYE || (value % 2 == 0 && (2..=40).contains(&value))
}

/// Whether `score` can be finished within one turn under the active rule.
pub fn is_checkout_range(score: u32, double_out: bool) -> bool {
    if double_out {
        score > 1 && score <= MAX_CHECKOUT
    } else {
        score > 0 && score <= MAX_CHECKOUT
    }
}

/// `score - 170` while a player is close to, but above, checkout range.
pub fn points_until_checkout(score: u32) -> Option<u32> {
    (score > MAX_CHECKOUT && score <= APPROACH_LIMIT).then(|| score - MAX_CHECKOUT)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CheckoutSuggestion {
    pub is_checkout: bool,
    pub sequence_label: Option<String>,
    pub first_dart_value: Option<u32>,
    pub first_dart_label: Option<String>,
}

impl CheckoutSuggestion {
    fn none() -> Self {
        Self::default()
    }

    fn from_route(darts: &[Dart]) -> Self {
        let Some(first) = darts.first() else {
            return Self::none();
        };
        Self {
            is_checkout: true,
            sequence_label: Some(route_label(darts)),
            first_dart_value: Some(first.value()),
            first_dart_label: Some(first.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOption {
    pub value: u32,
    pub label: String,
}

fn push_option(options: &mut Vec<CheckoutOption>, darts: &[Dart]) {
    let Some(first) = darts.first() else {
        return;
    };
    if options.len() < MAX_OPTIONS && !options.iter().any(|o| o.value == first.value()) {
        let label = darts.iter().map(Dart::route_label).collect::<Vec<_>>().join(" → ");
        options.push(CheckoutOption { value: first.value(), label });
    }
}

fn route_label(darts: &[Dart]) -> String {
    darts.iter().map(Dart::route_label).collect::<Vec<_>>().join(" ")
}

/// The canonical segment for a single-dart value: singles before doubles
/// before triples, bulls by value.
pub fn dart_for_value(value: u32) -> Option<Dart> {
    match value {
        1..=20 => Some(Dart::single(value as u8)),
        OUTER_BULL => Some(Dart::single(25)),
        BULLSEYE => Some(Dart::bull()),
        v if v % 2 == 0 && v <= 40 => Some(Dart::double((v / 2) as u8)),
        v if v % 3 == 0 && v <= 60 => Some(Dart::triple((v / 3) as u8)),
        _ => None,
    }
}

/// The finishing dart for `value` under double-out, if one exists.
fn finishing_double(value: u32) -> Option<Dart> {
    match value {
        BULLSEYE => Some(Dart::bull()),
        v if is_double(v) => Some(Dart::double((v / 2) as u8)),
        _ => None,
    }
}

fn table_route(score: u32) -> Option<Vec<Dart>> {
    let route = CHECKOUT_TABLE.get(&score)?;
    route
        .split_whitespace()
        .map(|token| parse_dart(token).ok())
        .collect()
}

/// Fewest darts reaching exactly `score` with any finishing dart, preferring
/// the highest first dart.
fn shortest_route(score: u32) -> Option<Vec<Dart>> {
    if let Some(d) = dart_for_value(score) {
        return Some(vec![d]);
    }
    let values = DART_VALUES_DESC.as_slice();
    for &first in values.iter().filter(|&&v| v < score) {
        if let Some(last) = dart_for_value(score - first) {
            return Some(vec![dart_for_value(first)?, last]);
        }
    }
    for &first in values.iter().filter(|&&v| v < score) {
        for &second in values.iter().filter(|&&v| v < score - first) {
            if let Some(last) = dart_for_value(score - first - second) {
                return Some(vec![dart_for_value(first)?, dart_for_value(second)?, last]);
            }
        }
    }
    None
}

/// The recommended finishing route for `score`, if any.
pub fn checkout_route(score: u32, double_out: bool) -> Option<Vec<Dart>> {
    if !is_checkout_range(score, double_out) {
        return None;
    }
    if double_out {
        table_route(score).or_else(|| finishing_double(score).map(|d| vec![d]))
    } else {
        shortest_route(score)
    }
}

/// Advisory finishing hint for `score`. Never used for legality.
pub fn suggest_checkout(score: u32, double_out: bool) -> CheckoutSuggestion {
    match checkout_route(score, double_out) {
        Some(route) => CheckoutSuggestion::from_route(&route),
        None => CheckoutSuggestion::none(),
    }
}

/// Candidate first darts that lead to a finish from `score`, for quick-select
/// buttons. Best-effort and not exhaustive.
pub fn all_checkout_options(score: u32, double_out: bool) -> Vec<CheckoutOption> {
    let mut options: Vec<CheckoutOption> = Vec::new();
    let Some(route) = checkout_route(score, double_out) else {
        return options;
    };

    let direct = if double_out {
        finishing_double(score)
    } else {
        dart_for_value(score)
    };
    if let Some(d) = direct {
        push_option(&mut options, &[d]);
    }
    push_option(&mut options, &route);

    // Two-dart setups: a first dart that leaves a one-dart finish.
    for &first in DART_VALUES_DESC.iter().filter(|&&v| v < score) {
        let rest = score - first;
        let last = if double_out {
            finishing_double(rest)
        } else {
            dart_for_value(rest)
        };
        if let (Some(a), Some(b)) = (dart_for_value(first), last) {
            push_option(&mut options, &[a, b]);
        }
        if options.len() >= MAX_OPTIONS {
            break;
        }
    }
    options
}
