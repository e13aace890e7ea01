//! Portuguese income tax with the Non-Habitual Resident (NHR) regime.
//!
//! NHR residents pay a flat rate on qualifying categories (employment in a
//! high-value activity, foreign pensions, exempt foreign income). All other
//! income, and every non-NHR filer, goes through the standard progressive
//! schedule plus the additional solidarity rate on high incomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, ratio};
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::calculations::BracketSchedule;
use crate::config::{ConfigError, build_schedule, check_rate};
use crate::format::Locale;
use crate::models::{BracketSpec, Report, ValidationError, check_amount as require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeType {
    Employment,
    Pension,
    ForeignIncome,
    Other,
}

/// How the income ends up being taxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    #[default]
    Standard,
    Flat(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortugalNhrConfig {
    pub employment_rate: Decimal,
    pub pension_rate: Decimal,
    pub foreign_income_rate: Decimal,
    pub brackets: Vec<BracketSpec>,
    pub solidarity_brackets: Vec<BracketSpec>,
}

impl Default for PortugalNhrConfig {
    fn default() -> Self {
        let flat = |bound: i64, rate: i64| BracketSpec::flat(Decimal::from(bound), Decimal::new(rate, 4));
        Self {
            employment_rate: Decimal::new(20, 2),
            pension_rate: Decimal::new(10, 2),
            foreign_income_rate: Decimal::ZERO,
            brackets: vec![
                flat(0, 1325),
                flat(7_703, 1800),
                flat(11_623, 2300),
                flat(16_472, 2600),
                flat(21_321, 3275),
                flat(27_146, 3700),
                flat(39_791, 4350),
                flat(51_997, 4500),
                flat(81_199, 4800),
            ],
            solidarity_brackets: vec![flat(0, 0), flat(80_000, 250), flat(250_000, 500)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortugalNhrInput {
    pub gross_income: Decimal,
    pub deductions: Decimal,
    pub income_type: IncomeType,
    pub nhr_status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortugalNhrResult {
    pub regime: Regime,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub solidarity_surcharge: Decimal,
    pub total_tax: Decimal,
    pub net_income: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

impl PortugalNhrResult {
    pub fn report(&self) -> Report {
        let regime = match self.regime {
            Regime::Standard => "standard progressive".to_string(),
            Regime::Flat(rate) => format!("NHR flat {}%", (rate * Decimal::ONE_HUNDRED).normalize()),
        };
        Report::new("Portugal income tax", Locale::Portuguese)
            .text("Regime", regime)
            .money("Taxable income", self.taxable_income)
            .money("Income tax", self.income_tax)
            .money("Solidarity surcharge", self.solidarity_surcharge)
            .money("Total tax", self.total_tax)
            .money("Net income", self.net_income)
            .rate("Effective rate", self.effective_rate)
            .rate("Marginal rate", self.marginal_rate)
    }
}

/// Portuguese income tax calculator.
#[derive(Debug, Clone)]
pub struct PortugalNhr {
    config: PortugalNhrConfig,
    schedule: BracketSchedule,
    solidarity: BracketSchedule,
}

const STEPS: &[Step<PortugalNhr, PortugalNhrInput, PortugalNhrResult>] = &[
    Step::new("taxable_income", taxable_income),
    Step::new("regime", regime),
    Step::new("income_tax", income_tax),
    Step::new("solidarity_surcharge", solidarity_surcharge),
    Step::new("totals", totals),
];

impl PortugalNhr {
    pub fn new(config: PortugalNhrConfig) -> Result<Self, ConfigError> {
        check_rate("employment_rate", config.employment_rate)?;
        check_rate("pension_rate", config.pension_rate)?;
        check_rate("foreign_income_rate", config.foreign_income_rate)?;
        let schedule = build_schedule("PT", &config.brackets)?;
        let solidarity = build_schedule("PT-SOLIDARITY", &config.solidarity_brackets)?;
        Ok(Self {
            config,
            schedule,
            solidarity,
        })
    }

    pub fn schedule(&self) -> &BracketSchedule {
        &self.schedule
    }

    fn flat_rate(
        &self,
        income_type: IncomeType,
    ) -> Option<Decimal> {
        match income_type {
            IncomeType::Employment => Some(self.config.employment_rate),
            IncomeType::Pension => Some(self.config.pension_rate),
            IncomeType::ForeignIncome => Some(self.config.foreign_income_rate),
            IncomeType::Other => None,
        }
    }
}

fn taxable_income(
    _calc: &PortugalNhr,
    input: &PortugalNhrInput,
    result: &mut PortugalNhrResult,
) {
    result.taxable_income = non_negative(input.gross_income - input.deductions);
}

fn regime(
    calc: &PortugalNhr,
    input: &PortugalNhrInput,
    result: &mut PortugalNhrResult,
) {
    result.regime = match calc.flat_rate(input.income_type) {
        Some(rate) if input.nhr_status => Regime::Flat(rate),
        _ => Regime::Standard,
    };
}

fn income_tax(
    calc: &PortugalNhr,
    _input: &PortugalNhrInput,
    result: &mut PortugalNhrResult,
) {
    match result.regime {
        Regime::Flat(rate) => {
            result.income_tax = result.taxable_income * rate;
            result.marginal_rate = rate;
        }
        Regime::Standard => {
            result.income_tax = calc.schedule.tax(result.taxable_income);
            result.marginal_rate = calc.schedule.marginal_rate(result.taxable_income);
        }
    }
}

fn solidarity_surcharge(
    calc: &PortugalNhr,
    _input: &PortugalNhrInput,
    result: &mut PortugalNhrResult,
) {
    if result.regime == Regime::Standard {
        result.solidarity_surcharge = calc.solidarity.tax(result.taxable_income);
        result.marginal_rate += calc.solidarity.marginal_rate(result.taxable_income);
    }
}

fn totals(
    _calc: &PortugalNhr,
    input: &PortugalNhrInput,
    result: &mut PortugalNhrResult,
) {
    result.total_tax = result.income_tax + result.solidarity_surcharge;
    result.net_income = input.gross_income - result.total_tax;
    result.effective_rate = ratio(result.total_tax, input.gross_income);
}

impl Calculator for PortugalNhr {
    type Input = PortugalNhrInput;
    type Output = PortugalNhrResult;

    fn name(&self) -> &'static str {
        "pt-nhr"
    }

    fn validate(
        &self,
        input: &PortugalNhrInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "gross_income", input.gross_income);
        require(&mut errors, "deductions", input.deductions);
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
        input: &PortugalNhrInput,
    ) -> PortugalNhrResult {
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

    fn calculator() -> PortugalNhr {
        PortugalNhr::new(PortugalNhrConfig::default()).unwrap()
    }

    fn input(
        gross_income: Decimal,
        income_type: IncomeType,
        nhr_status: bool,
    ) -> PortugalNhrInput {
        PortugalNhrInput {
            gross_income,
            deductions: dec!(0),
            income_type,
            nhr_status,
        }
    }

    #[test]
    fn nhr_employment_pays_flat_twenty_percent() {
        let result = calculator()
            .calculate(&input(dec!(100000), IncomeType::Employment, true))
            .unwrap();

        assert_eq!(result.regime, Regime::Flat(dec!(0.20)));
        assert_eq!(result.income_tax, dec!(20000));
        assert_eq!(result.solidarity_surcharge, dec!(0));
        assert_eq!(result.effective_rate, dec!(0.2));
    }

    #[test]
    fn nhr_pension_pays_ten_percent() {
        let result = calculator()
            .calculate(&input(dec!(40000), IncomeType::Pension, true))
            .unwrap();

        assert_eq!(result.total_tax, dec!(4000));
    }

    #[test]
    fn nhr_foreign_income_is_exempt() {
        let result = calculator()
            .calculate(&input(dec!(250000), IncomeType::ForeignIncome, true))
            .unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.net_income, dec!(250000));
    }

    #[test]
    fn nhr_other_income_uses_standard_schedule() {
        let calc = calculator();
        let result = calc
            .calculate(&input(dec!(50000), IncomeType::Other, true))
            .unwrap();

        assert_eq!(result.regime, Regime::Standard);
        assert_eq!(result.income_tax, calc.schedule().tax(dec!(50000)));
    }

    #[test]
    fn standard_schedule_first_bracket() {
        let result = calculator()
            .calculate(&input(dec!(7000), IncomeType::Employment, false))
            .unwrap();

        assert_eq!(result.income_tax, dec!(927.5));
        assert_eq!(result.marginal_rate, dec!(0.1325));
    }

    #[test]
    fn standard_schedule_two_brackets() {
        let result = calculator()
            .calculate(&input(dec!(10000), IncomeType::Employment, false))
            .unwrap();

        // 7,703 × 13.25% + 2,297 × 18%
        assert_eq!(result.income_tax, dec!(1434.1075));
    }

    #[test]
    fn solidarity_rate_applies_above_eighty_thousand() {
        let calc = calculator();
        let result = calc
            .calculate(&input(dec!(100000), IncomeType::Other, false))
            .unwrap();

        assert_eq!(result.solidarity_surcharge, dec!(500));
        assert_eq!(result.marginal_rate, dec!(0.505));
        assert_eq!(result.total_tax, result.income_tax + dec!(500));
    }

    #[test]
    fn deductions_reduce_taxable_income() {
        let result = calculator()
            .calculate(&PortugalNhrInput {
                deductions: dec!(4104),
                ..input(dec!(20000), IncomeType::Employment, true)
            })
            .unwrap();

        assert_eq!(result.taxable_income, dec!(15896));
        assert_eq!(result.income_tax, dec!(3179.2));
    }

    #[test]
    fn deductions_above_income_are_rejected() {
        let errors = calculator()
            .calculate(&PortugalNhrInput {
                deductions: dec!(30000),
                ..input(dec!(20000), IncomeType::Employment, true)
            })
            .unwrap_err();

        assert!(errors.has_field("deductions"));
    }

    #[test]
    fn report_names_the_regime() {
        let result = calculator()
            .calculate(&input(dec!(100000), IncomeType::Employment, true))
            .unwrap();

        assert_eq!(
            result.report().render()[0],
            ("Regime".to_string(), "NHR flat 20%".to_string())
        );
    }
}
