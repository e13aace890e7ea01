//! Dutch Box 1 income tax with the 30% ruling.
//!
//! Under the ruling an employer may pay part of the salary (up to 30%) as a
//! tax-free allowance. The remainder, less deductions, is taxed on the Box 1
//! brackets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, ratio};
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::calculations::BracketSchedule;
use crate::config::{ConfigError, build_schedule, check_non_negative};
use crate::format::Locale;
use crate::models::{BracketSpec, BracketTax, Report, ValidationError, check_amount as require};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetherlandsIncomeConfig {
    pub brackets: Vec<BracketSpec>,
    /// Highest ruling percentage accepted, in percent.
    pub max_ruling_percentage: Decimal,
}

impl Default for NetherlandsIncomeConfig {
    fn default() -> Self {
        Self {
            brackets: vec![
                BracketSpec::flat(Decimal::ZERO, Decimal::new(3582, 4)),
                BracketSpec::flat(Decimal::from(38_441), Decimal::new(3748, 4)),
                BracketSpec::flat(Decimal::from(76_817), Decimal::new(4950, 4)),
            ],
            max_ruling_percentage: Decimal::from(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetherlandsIncomeInput {
    pub gross_income: Decimal,
    /// Ruling percentage in percent (`30` for the full ruling, `0` without).
    pub ruling_percentage: Decimal,
    pub deductions: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetherlandsIncomeResult {
    pub gross_income: Decimal,
    pub ruling_benefit: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub brackets: Vec<BracketTax>,
    pub net_income: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

impl NetherlandsIncomeResult {
    pub fn report(&self) -> Report {
        let mut report = Report::new("Netherlands income tax", Locale::Dutch)
            .money("Gross income", self.gross_income)
            .money("30% ruling benefit", self.ruling_benefit)
            .money("Taxable income", self.taxable_income);
        for bracket in &self.brackets {
            report = report.money(
                &format!("Bracket {} tax", bracket.bracket_index + 1),
                bracket.tax,
            );
        }
        report
            .money("Income tax", self.income_tax)
            .money("Net income", self.net_income)
            .rate("Effective rate", self.effective_rate)
            .rate("Marginal rate", self.marginal_rate)
    }
}

/// Box 1 calculator.
#[derive(Debug, Clone)]
pub struct NetherlandsIncomeTax {
    config: NetherlandsIncomeConfig,
    schedule: BracketSchedule,
}

const STEPS: &[Step<NetherlandsIncomeTax, NetherlandsIncomeInput, NetherlandsIncomeResult>] = &[
    Step::new("ruling_benefit", ruling_benefit),
    Step::new("taxable_income", taxable_income),
    Step::new("income_tax", income_tax),
    Step::new("totals", totals),
];

impl NetherlandsIncomeTax {
    pub fn new(config: NetherlandsIncomeConfig) -> Result<Self, ConfigError> {
        check_non_negative("max_ruling_percentage", config.max_ruling_percentage)?;
        let schedule = build_schedule("NL", &config.brackets)?;
        Ok(Self { config, schedule })
    }

    pub fn schedule(&self) -> &BracketSchedule {
        &self.schedule
    }
}

fn ruling_benefit(
    _calc: &NetherlandsIncomeTax,
    input: &NetherlandsIncomeInput,
    result: &mut NetherlandsIncomeResult,
) {
    result.gross_income = input.gross_income;
    result.ruling_benefit = input.gross_income * input.ruling_percentage / Decimal::ONE_HUNDRED;
}

fn taxable_income(
    _calc: &NetherlandsIncomeTax,
    input: &NetherlandsIncomeInput,
    result: &mut NetherlandsIncomeResult,
) {
    result.taxable_income =
        non_negative(input.gross_income - result.ruling_benefit - input.deductions);
}

fn income_tax(
    calc: &NetherlandsIncomeTax,
    _input: &NetherlandsIncomeInput,
    result: &mut NetherlandsIncomeResult,
) {
    result.brackets = calc.schedule.breakdown(result.taxable_income);
    result.income_tax = result.brackets.iter().map(|b| b.tax).sum();
    result.marginal_rate = calc.schedule.marginal_rate(result.taxable_income);
}

fn totals(
    _calc: &NetherlandsIncomeTax,
    input: &NetherlandsIncomeInput,
    result: &mut NetherlandsIncomeResult,
) {
    result.net_income = input.gross_income - result.income_tax;
    result.effective_rate = ratio(result.income_tax, input.gross_income);
}

impl Calculator for NetherlandsIncomeTax {
    type Input = NetherlandsIncomeInput;
    type Output = NetherlandsIncomeResult;

    fn name(&self) -> &'static str {
        "nl-income"
    }

    fn validate(
        &self,
        input: &NetherlandsIncomeInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "gross_income", input.gross_income);
        require(&mut errors, "deductions", input.deductions);
        if input.ruling_percentage < Decimal::ZERO
            || input.ruling_percentage > self.config.max_ruling_percentage
        {
            errors.push(ValidationError::new(
                "ruling_percentage",
                format!(
                    "must be between 0 and {}, got {}",
                    self.config.max_ruling_percentage, input.ruling_percentage
                ),
            ));
        }
        if input.deductions > input.gross_income && input.gross_income >= Decimal::ZERO {
            errors.push(ValidationError::new(
                "deductions",
                "must not exceed gross income",
            ));
        }
        errors
    }

    fn compute(
        &self,
        input: &NetherlandsIncomeInput,
    ) -> NetherlandsIncomeResult {
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

    fn calculator() -> NetherlandsIncomeTax {
        NetherlandsIncomeTax::new(NetherlandsIncomeConfig::default()).unwrap()
    }

    #[test]
    fn thirty_percent_ruling_with_deductions() {
        let result = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(60000),
                ruling_percentage: dec!(30),
                deductions: dec!(2000),
            })
            .unwrap();

        assert_eq!(result.ruling_benefit, dec!(18000));
        assert_eq!(result.taxable_income, dec!(40000));
        assert_eq!(result.brackets.len(), 2);
        assert_eq!(result.brackets[0].income_in_bracket, dec!(38441));
        assert_eq!(result.brackets[1].income_in_bracket, dec!(1559));
        // 38,441 × 35.82% + 1,559 × 37.48%
        assert_eq!(result.income_tax, dec!(14353.8794));
        assert_eq!(result.marginal_rate, dec!(0.3748));
        assert_eq!(result.net_income, dec!(45646.1206));
    }

    #[test]
    fn without_ruling_full_salary_is_taxed() {
        let result = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(100000),
                ruling_percentage: dec!(0),
                deductions: dec!(0),
            })
            .unwrap();

        assert_eq!(result.ruling_benefit, dec!(0));
        assert_eq!(result.brackets.len(), 3);
        assert_eq!(result.marginal_rate, dec!(0.4950));
    }

    #[test]
    fn ruling_above_maximum_is_rejected() {
        let errors = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(60000),
                ruling_percentage: dec!(35),
                deductions: dec!(0),
            })
            .unwrap_err();

        assert_eq!(
            errors.messages(),
            vec!["ruling_percentage: must be between 0 and 30, got 35"]
        );
    }

    #[test]
    fn deductions_exceeding_income_are_rejected() {
        let errors = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(1000),
                ruling_percentage: dec!(0),
                deductions: dec!(2000),
            })
            .unwrap_err();

        assert!(errors.has_field("deductions"));
    }

    #[test]
    fn ruling_and_deductions_never_push_taxable_income_below_zero() {
        let result = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(10000),
                ruling_percentage: dec!(30),
                deductions: dec!(9000),
            })
            .unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.income_tax, dec!(0));
        assert!(result.brackets.is_empty());
    }

    #[test]
    fn report_lists_bracket_lines() {
        let result = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(60000),
                ruling_percentage: dec!(30),
                deductions: dec!(2000),
            })
            .unwrap();

        let rendered = result.report().render();

        assert!(rendered.contains(&("Bracket 2 tax".to_string(), "€ 584".to_string())));
        assert!(rendered.contains(&("Taxable income".to_string(), "€ 40.000".to_string())));
    }

    #[test]
    fn gross_beyond_max_is_rejected_not_computed() {
        let errors = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: dec!(3000000000000000000000000000),
                ruling_percentage: dec!(30),
                deductions: dec!(0),
            })
            .unwrap_err();

        assert!(errors.has_field("gross_income"));
    }

    #[test]
    fn largest_accepted_gross_computes() {
        let result = calculator()
            .calculate(&NetherlandsIncomeInput {
                gross_income: MAX_AMOUNT,
                ruling_percentage: dec!(30),
                deductions: MAX_AMOUNT,
            })
            .unwrap();

        assert_eq!(result.ruling_benefit, MAX_AMOUNT * dec!(0.3));
        assert_eq!(result.taxable_income, dec!(0));
    }
}
