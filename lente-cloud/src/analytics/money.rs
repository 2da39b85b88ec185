//! Decimal helpers for KPI arithmetic
//!
//! Rows carry `f64`; sums and ratios are computed in `Decimal` and converted
//! back to `f64` (2 decimal places) only when building the response.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert f64 to Decimal, treating non-finite input as zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in analytics input, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a monetary amount to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// A stored monetary column as cents
///
/// Every bucket sums the same rounded values, so per-day, per-category and
/// per-method totals add up to the headline total exactly.
#[inline]
pub fn amount(value: f64) -> Decimal {
    round_money(to_decimal(value))
}

/// `part / whole * 100`, 0 when `whole` is zero
pub fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    to_f64(part / whole * HUNDRED)
}

/// Count ratio as a percentage, 0 when `total` is zero or negative
pub fn rate(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    percentage(Decimal::from(count), Decimal::from(total))
}

/// Period-over-period growth: `(current - previous) / previous * 100`
///
/// 0 when `previous` is zero, whatever `current` is.
pub fn growth(current: Decimal, previous: Decimal) -> f64 {
    if previous.is_zero() {
        return 0.0;
    }
    percentage(current - previous, previous)
}
