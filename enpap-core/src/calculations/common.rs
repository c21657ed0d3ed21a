//! Common utility functions for contribution and tax calculations.
//!
//! Shared arithmetic used by the worksheet calculations: financial rounding
//! and floor handling.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Standard financial rounding: values at exactly 0.005 round away from zero
/// to 0.01.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use enpap_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(39764.7042)), dec!(39764.70));
/// assert_eq!(round_half_up(dec!(1019.6078)), dec!(1019.61));
/// assert_eq!(round_half_up(dec!(-76.8333)), dec!(-76.83));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// Used to apply contribution floors: `max(computed, minimum)` never reduces
/// a computed value that already exceeds the minimum.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use enpap_core::calculations::common::max;
///
/// assert_eq!(max(dec!(1019.61), dec!(66.00)), dec!(1019.61));
/// assert_eq!(max(dec!(0.00), dec!(66.00)), dec!(66.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
