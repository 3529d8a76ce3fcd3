//! 01-style countdown rules (501, 301): board notation and checkouts.

pub mod board;
pub mod checkout;

pub use board::{
    parse_dart, parse_input, parse_throw, validate_throw_value, Dart, InputError, Throw, QUICK_PICKS,
};
pub use checkout::{
    all_checkout_options, is_checkout_range, is_double, suggest_checkout, CheckoutOption,
    CheckoutSuggestion,
};
