//! Spanish capital gains tax for non-residents selling property.
//!
//! The buyer withholds a share of the sale price and pays it to the tax
//! office on the seller's behalf. The withholding is credited against the tax
//! on the gain, so the net amount can come out negative (a refund).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::BracketSchedule;
use crate::calculations::common::{non_negative, ratio};
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::config::{ConfigError, check_rate};
use crate::format::Locale;
use crate::models::{Report, ValidationError, check_amount as require};

/// Seller residency for the purpose of the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Residency {
    /// EU or EEA resident.
    Eu,
    NonEu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpainCapitalGainsConfig {
    pub eu_rate: Decimal,
    pub non_eu_rate: Decimal,
    /// Share of the sale price withheld by the buyer.
    pub withholding_rate: Decimal,
}

impl Default for SpainCapitalGainsConfig {
    fn default() -> Self {
        Self {
            eu_rate: Decimal::new(19, 2),
            non_eu_rate: Decimal::new(24, 2),
            withholding_rate: Decimal::new(3, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpainCapitalGainsInput {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    /// Acquisition and sale costs (notary, registry, agent fees).
    pub expenses: Decimal,
    pub residency: Residency,
    pub withholding_applied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpainCapitalGainsResult {
    /// Negative for a loss.
    pub capital_gain: Decimal,
    pub taxable_gain: Decimal,
    pub tax_rate: Decimal,
    pub gross_tax: Decimal,
    pub withholding: Decimal,
    /// Negative when the withholding exceeds the tax.
    pub net_due: Decimal,
    /// Gross tax over the gain.
    pub effective_rate: Decimal,
}

impl SpainCapitalGainsResult {
    pub fn is_refund(&self) -> bool {
        self.net_due < Decimal::ZERO
    }

    pub fn report(&self) -> Report {
        let report = Report::new("Spain capital gains", Locale::Spanish)
            .money("Capital gain", self.capital_gain)
            .money("Taxable gain", self.taxable_gain)
            .rate("Tax rate", self.tax_rate)
            .money("Gross tax", self.gross_tax)
            .money("Withholding", self.withholding);
        let report = if self.is_refund() {
            report.money("Refund", -self.net_due)
        } else {
            report.money("Net due", self.net_due)
        };
        report.rate("Effective rate", self.effective_rate)
    }
}

/// Capital gains calculator. The rates are single-bracket schedules.
#[derive(Debug, Clone)]
pub struct SpainCapitalGains {
    config: SpainCapitalGainsConfig,
    eu: BracketSchedule,
    non_eu: BracketSchedule,
}

const STEPS: &[Step<SpainCapitalGains, SpainCapitalGainsInput, SpainCapitalGainsResult>] = &[
    Step::new("capital_gain", capital_gain),
    Step::new("gross_tax", gross_tax),
    Step::new("withholding", withholding),
    Step::new("totals", totals),
];

impl SpainCapitalGains {
    pub fn new(config: SpainCapitalGainsConfig) -> Result<Self, ConfigError> {
        check_rate("withholding_rate", config.withholding_rate)?;
        let eu = flat_schedule("ES-EU", config.eu_rate)?;
        let non_eu = flat_schedule("ES-NON-EU", config.non_eu_rate)?;
        Ok(Self { config, eu, non_eu })
    }

    pub fn config(&self) -> &SpainCapitalGainsConfig {
        &self.config
    }

    fn schedule(
        &self,
        residency: Residency,
    ) -> &BracketSchedule {
        match residency {
            Residency::Eu => &self.eu,
            Residency::NonEu => &self.non_eu,
        }
    }
}

fn flat_schedule(
    name: &str,
    rate: Decimal,
) -> Result<BracketSchedule, ConfigError> {
    BracketSchedule::flat(rate).map_err(|source| ConfigError::Schedule {
        name: name.to_string(),
        source,
    })
}

fn capital_gain(
    _calc: &SpainCapitalGains,
    input: &SpainCapitalGainsInput,
    result: &mut SpainCapitalGainsResult,
) {
    result.capital_gain = input.sale_price - input.purchase_price - input.expenses;
    result.taxable_gain = non_negative(result.capital_gain);
}

fn gross_tax(
    calc: &SpainCapitalGains,
    input: &SpainCapitalGainsInput,
    result: &mut SpainCapitalGainsResult,
) {
    let schedule = calc.schedule(input.residency);
    result.tax_rate = schedule.marginal_rate(result.taxable_gain);
    result.gross_tax = schedule.tax(result.taxable_gain);
}

fn withholding(
    calc: &SpainCapitalGains,
    input: &SpainCapitalGainsInput,
    result: &mut SpainCapitalGainsResult,
) {
    if input.withholding_applied {
        result.withholding = input.sale_price * calc.config.withholding_rate;
    }
}

fn totals(
    _calc: &SpainCapitalGains,
    _input: &SpainCapitalGainsInput,
    result: &mut SpainCapitalGainsResult,
) {
    result.net_due = result.gross_tax - result.withholding;
    result.effective_rate = ratio(result.gross_tax, result.capital_gain);
}

impl Calculator for SpainCapitalGains {
    type Input = SpainCapitalGainsInput;
    type Output = SpainCapitalGainsResult;

    fn name(&self) -> &'static str {
        "es-capital-gains"
    }

    fn validate(
        &self,
        input: &SpainCapitalGainsInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "purchase_price", input.purchase_price);
        require(&mut errors, "sale_price", input.sale_price);
        require(&mut errors, "expenses", input.expenses);
        errors
    }

    fn compute(
        &self,
        input: &SpainCapitalGainsInput,
    ) -> SpainCapitalGainsResult {
        Pipeline::new(STEPS).run(self, input)
    }

    fn steps(&self) -> Vec<&'static str> {
        Pipeline::new(STEPS).step_names()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::MAX_AMOUNT;
    use crate::models::ReportValue;

    fn calculator() -> SpainCapitalGains {
        SpainCapitalGains::new(SpainCapitalGainsConfig::default()).unwrap()
    }

    fn sale(residency: Residency) -> SpainCapitalGainsInput {
        SpainCapitalGainsInput {
            purchase_price: dec!(200000),
            sale_price: dec!(300000),
            expenses: dec!(5000),
            residency,
            withholding_applied: true,
        }
    }

    #[test]
    fn eu_resident_with_withholding() {
        let result = calculator().calculate(&sale(Residency::Eu)).unwrap();

        assert_eq!(result.capital_gain, dec!(95000));
        assert_eq!(result.gross_tax, dec!(18050));
        assert_eq!(result.withholding, dec!(9000));
        assert_eq!(result.net_due, dec!(9050));
        assert!(!result.is_refund());
        assert_eq!(result.effective_rate, dec!(0.19));
    }

    #[test]
    fn non_eu_resident_pays_higher_rate() {
        let result = calculator().calculate(&sale(Residency::NonEu)).unwrap();

        assert_eq!(result.tax_rate, dec!(0.24));
        assert_eq!(result.gross_tax, dec!(22800));
        assert_eq!(result.net_due, dec!(13800));
    }

    #[test]
    fn without_withholding_full_tax_is_due() {
        let result = calculator()
            .calculate(&SpainCapitalGainsInput {
                withholding_applied: false,
                ..sale(Residency::Eu)
            })
            .unwrap();

        assert_eq!(result.withholding, dec!(0));
        assert_eq!(result.net_due, dec!(18050));
    }

    #[test]
    fn loss_owes_nothing_and_withholding_is_refunded() {
        let result = calculator()
            .calculate(&SpainCapitalGainsInput {
                sale_price: dec!(190000),
                ..sale(Residency::Eu)
            })
            .unwrap();

        assert_eq!(result.capital_gain, dec!(-15000));
        assert_eq!(result.taxable_gain, dec!(0));
        assert_eq!(result.gross_tax, dec!(0));
        assert_eq!(result.net_due, dec!(-5700));
        assert!(result.is_refund());
        assert_eq!(result.effective_rate, dec!(0));
    }

    #[test]
    fn report_shows_refund_as_positive_amount() {
        let result = calculator()
            .calculate(&SpainCapitalGainsInput {
                sale_price: dec!(190000),
                ..sale(Residency::Eu)
            })
            .unwrap();

        assert_eq!(result.report().value("Refund"), Some(&ReportValue::Money(dec!(5700))));
        assert!(
            result
                .report()
                .render()
                .contains(&("Refund".to_string(), "5700 €".to_string())));
    }

    #[test]
    fn report_formats_net_due() {
        let result = calculator().calculate(&sale(Residency::Eu)).unwrap();

        assert!(
            result
                .report()
                .render()
                .contains(&("Net due".to_string(), "9050 €".to_string()))
        );
    }

    #[test]
    fn negative_prices_are_rejected() {
        let errors = calculator()
            .calculate(&SpainCapitalGainsInput {
                purchase_price: dec!(-1),
                expenses: dec!(-1),
                ..sale(Residency::Eu)
            })
            .unwrap_err();

        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn amounts_beyond_max_are_rejected_not_computed() {
        let errors = calculator()
            .calculate(&SpainCapitalGainsInput {
                purchase_price: Decimal::MAX,
                sale_price: dec!(0),
                expenses: Decimal::MAX,
                residency: Residency::Eu,
                withholding_applied: true,
            })
            .unwrap_err();

        assert!(errors.has_field("purchase_price"));
        assert!(errors.has_field("expenses"));
        assert!(!errors.has_field("sale_price"));
    }

    #[test]
    fn largest_accepted_amounts_compute() {
        let result = calculator()
            .calculate(&SpainCapitalGainsInput {
                purchase_price: MAX_AMOUNT,
                sale_price: dec!(0),
                expenses: MAX_AMOUNT,
                residency: Residency::NonEu,
                withholding_applied: true,
            })
            .unwrap();

        assert_eq!(result.capital_gain, -MAX_AMOUNT * dec!(2));
        assert_eq!(result.gross_tax, dec!(0));
    }
}
