use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a bracket table as it appears in configuration.
///
/// `rate` applies from `lower_bound` up to the next row's `lower_bound`. When
/// `rate_end` is set the marginal rate rises linearly from `rate` to
/// `rate_end` across that range instead of staying flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSpec {
    pub lower_bound: Decimal,
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_end: Option<Decimal>,
}

impl BracketSpec {
    /// A bracket with a constant marginal rate.
    pub fn flat(
        lower_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            rate,
            rate_end: None,
        }
    }

    /// A bracket whose marginal rate rises linearly from `rate` to `rate_end`.
    pub fn linear(
        lower_bound: Decimal,
        rate: Decimal,
        rate_end: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            rate,
            rate_end: Some(rate_end),
        }
    }
}

/// Tax attributed to a single bracket by
/// [`BracketSchedule::breakdown`](crate::calculations::BracketSchedule::breakdown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTax {
    pub bracket_index: usize,
    pub income_in_bracket: Decimal,
    /// Average rate applied to `income_in_bracket`; the marginal rate for
    /// flat brackets.
    pub rate: Decimal,
    pub tax: Decimal,
}
