//! en-US number rendering for the scalar display nodes.
//!
//! Fractions are rounded on the exact binary value with halves going away from
//! zero, which is what `toLocaleString('en-US')` and `toFixed` do.

use num_format::{Locale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};

/// Nearest integer, halves rounded towards positive infinity (`Math.round`).
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// `1234567` -> `"1,234,567"`.
pub fn format_grouped_integer(value: i64) -> String {
    value.to_formatted_string(&Locale::en)
}

/// Revenue text with two to three fraction digits, e.g. `"1,234.50"` or `"1,234.568"`.
pub fn format_revenue(value: f64) -> String {
    format_grouped_decimal(value, 2, 3)
}

pub fn format_grouped_decimal(value: f64, min_fraction: u32, max_fraction: u32) -> String {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value.to_string();
    };
    let rounded = exact
        .round_dp_with_strategy(max_fraction, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    let whole: u128 = int_part.parse().unwrap_or_default();

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&whole.to_formatted_string(&Locale::en));

    let mut frac = frac_part.to_string();
    while frac.len() < min_fraction as usize {
        frac.push('0');
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Exactly `digits` fraction digits and no grouping, like `toFixed`.
pub fn format_fixed(value: f64, digits: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let mut rounded =
                exact.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(digits);
            rounded.to_string()
        }
        None => format!("{value:.*}", digits as usize),
    }
}
