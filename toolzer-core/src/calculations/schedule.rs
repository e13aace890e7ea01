//! Progressive bracket evaluation shared by every calculator.
//!
//! A [`BracketSchedule`] is an ordered, contiguous table of brackets starting
//! at zero. Income inside `[lower_bound, next.lower_bound)` is taxed at the
//! bracket's rate and the top bracket has no upper limit. A bracket may also
//! be a *linear progression zone*: its marginal rate rises linearly from
//! `rate` to `rate_end` across the bracket, as in the German tariff.
//!
//! Amounts are never rounded between brackets; the total is the exact sum of
//! the per-bracket breakdown.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolzer_core::BracketSpec;
//! use toolzer_core::calculations::BracketSchedule;
//!
//! let schedule = BracketSchedule::new(vec![
//!     BracketSpec::flat(dec!(0), dec!(0.3582)),
//!     BracketSpec::flat(dec!(38441), dec!(0.3748)),
//!     BracketSpec::flat(dec!(76817), dec!(0.4950)),
//! ])
//! .unwrap();
//!
//! let tax = schedule.tax(dec!(40000));
//! assert_eq!(tax, dec!(14353.8794));
//! assert_eq!(schedule.breakdown(dec!(40000)).len(), 2);
//! assert_eq!(schedule.marginal_rate(dec!(40000)), dec!(0.3748));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::calculations::common::is_unit_rate;
use crate::models::{BracketSpec, BracketTax};

/// Configuration errors detected while building a schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("bracket schedule must contain at least one bracket")]
    Empty,

    #[error("first bracket must start at 0, got {0}")]
    FirstBoundNotZero(Decimal),

    #[error("bracket {index} lower bound {bound} does not exceed previous bound {previous}")]
    NonMonotonicBound {
        index: usize,
        bound: Decimal,
        previous: Decimal,
    },

    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("top bracket cannot carry a rate progression")]
    OpenEndedProgression,
}

/// A validated progressive bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSchedule {
    brackets: Vec<BracketSpec>,
}

impl BracketSchedule {
    /// Validates and wraps a bracket table.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the table is empty, does not start at
    /// zero, has non-increasing bounds, has a rate outside `[0, 1]`, or ends
    /// in a progression zone.
    pub fn new(brackets: Vec<BracketSpec>) -> Result<Self, ScheduleError> {
        let first = brackets.first().ok_or(ScheduleError::Empty)?;
        if !first.lower_bound.is_zero() {
            return Err(ScheduleError::FirstBoundNotZero(first.lower_bound));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if !is_unit_rate(bracket.rate) {
                return Err(ScheduleError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if let Some(rate_end) = bracket.rate_end {
                if !is_unit_rate(rate_end) {
                    return Err(ScheduleError::InvalidRate {
                        index,
                        rate: rate_end,
                    });
                }
            }
            if index > 0 {
                let previous = brackets[index - 1].lower_bound;
                if bracket.lower_bound <= previous {
                    return Err(ScheduleError::NonMonotonicBound {
                        index,
                        bound: bracket.lower_bound,
                        previous,
                    });
                }
            }
        }

        if brackets.last().is_some_and(|b| b.rate_end.is_some()) {
            return Err(ScheduleError::OpenEndedProgression);
        }

        Ok(Self { brackets })
    }

    /// A single-bracket schedule taxing every unit at `rate`.
    pub fn flat(rate: Decimal) -> Result<Self, ScheduleError> {
        Self::new(vec![BracketSpec::flat(Decimal::ZERO, rate)])
    }

    pub fn brackets(&self) -> &[BracketSpec] {
        &self.brackets
    }

    /// Upper bound of bracket `index`; `None` for the top bracket or an
    /// index past the end.
    pub fn upper_bound(
        &self,
        index: usize,
    ) -> Option<Decimal> {
        self.brackets.get(index + 1).map(|b| b.lower_bound)
    }

    /// Amount taxed at zero before the first positive rate applies.
    pub fn tax_free_amount(&self) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.rate > Decimal::ZERO || b.rate_end.is_some_and(|r| r > Decimal::ZERO))
            .map(|b| b.lower_bound)
            .unwrap_or(Decimal::MAX)
    }

    /// Total tax owed on `amount`. Zero for `amount <= 0`.
    pub fn tax(
        &self,
        amount: Decimal,
    ) -> Decimal {
        self.breakdown(amount).iter().map(|b| b.tax).sum()
    }

    /// Per-bracket tax on `amount`, in ascending bracket order.
    ///
    /// Only brackets that receive income appear; the result is empty for
    /// `amount <= 0`.
    pub fn breakdown(
        &self,
        amount: Decimal,
    ) -> Vec<BracketTax> {
        if amount <= Decimal::ZERO {
            return Vec::new();
        }

        let mut lines = Vec::new();
        for (index, bracket) in self.brackets.iter().enumerate() {
            if amount <= bracket.lower_bound {
                break;
            }
            let top = match self.upper_bound(index) {
                Some(upper) => amount.min(upper),
                None => amount,
            };
            let income_in_bracket = top - bracket.lower_bound;
            let tax = self.tax_within(index, income_in_bracket);
            lines.push(BracketTax {
                bracket_index: index,
                income_in_bracket,
                rate: tax / income_in_bracket,
                tax,
            });
        }
        lines
    }

    /// Rate applied to the next unit of income above `amount`.
    pub fn marginal_rate(
        &self,
        amount: Decimal,
    ) -> Decimal {
        let index = self
            .brackets
            .iter()
            .rposition(|b| b.lower_bound <= amount)
            .unwrap_or(0);
        let bracket = &self.brackets[index];

        match (bracket.rate_end, self.upper_bound(index)) {
            (Some(rate_end), Some(upper)) => {
                let position = (amount - bracket.lower_bound).max(Decimal::ZERO);
                bracket.rate
                    + (rate_end - bracket.rate) * position / (upper - bracket.lower_bound)
            }
            _ => bracket.rate,
        }
    }

    /// Tax on the first `income` units of bracket `index`.
    fn tax_within(
        &self,
        index: usize,
        income: Decimal,
    ) -> Decimal {
        let bracket = &self.brackets[index];
        match (bracket.rate_end, self.upper_bound(index)) {
            (Some(rate_end), Some(upper)) => {
                let width = upper - bracket.lower_bound;
                income * bracket.rate
                    + (rate_end - bracket.rate) * income * income / (Decimal::TWO * width)
            }
            _ => income * bracket.rate,
        }
    }
}
