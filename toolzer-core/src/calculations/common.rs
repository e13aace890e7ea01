//! Common utility functions for the calculators.
//!
//! This module provides shared arithmetic used across jurisdictions: explicit
//! rounding policies, floors, caps and rate derivation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use toolzer_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to whole currency units, half away from zero.
///
/// Used where a jurisdiction rounds an intermediate amount on purpose (the
/// monthly Elterngeld amount) and by the presentation layer.
///
/// ```
/// use rust_decimal_macros::dec;
/// use toolzer_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(1299.5)), dec!(1300));
/// assert_eq!(round_whole(dec!(1299.49)), dec!(1299));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use toolzer_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Floors a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Contribution on an amount whose base is capped at `ceiling`.
///
/// Every amount at or above the ceiling yields the same contribution.
pub fn capped_contribution(
    amount: Decimal,
    ceiling: Decimal,
    rate: Decimal,
) -> Decimal {
    non_negative(amount.min(ceiling)) * rate
}

/// `part / whole`, or zero when `whole` is not positive.
pub fn ratio(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        part / whole
    }
}

/// Returns `true` when `rate` lies in the closed interval `[0, 1]`.
pub fn is_unit_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}
