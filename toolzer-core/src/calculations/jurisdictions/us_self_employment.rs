//! US self-employment tax and estimated federal income tax.
//!
//! The self-employment part follows the SE Tax and Deduction Worksheet of
//! Form 1040-ES:
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Net profit from self-employment |
//! | 2    | Line 1 × 92.35% (net earnings factor) |
//! | 3    | Medicare tax: Line 2 × 2.9% |
//! | 4    | Social security wage base less W-2 wages (not below zero) |
//! | 5    | Smaller of Line 2 or Line 4 |
//! | 6    | Social security tax: Line 5 × 12.4% |
//! | 7    | Self-employment tax: Line 3 + Line 6 |
//! | 8    | Deductible part of SE tax: Line 7 × 50% |
//!
//! Additional Medicare tax (0.9%) applies to net earnings above the
//! filing-status threshold, reduced by W-2 wages. Federal income tax is
//! estimated on profit plus wages, less the SE deduction and the standard
//! deduction, and the total is split into quarterly payments.
//!
//! If net profit is $400 or less, no self-employment tax is due. The
//! threshold is configurable via [`SelfEmploymentConfig::min_se_threshold`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolzer_core::FilingStatus;
//! use toolzer_core::calculations::Calculator;
//! use toolzer_core::calculations::jurisdictions::{
//!     SelfEmploymentConfig, SelfEmploymentInput, SelfEmploymentTax,
//! };
//!
//! let calc = SelfEmploymentTax::new(SelfEmploymentConfig::default()).unwrap();
//! let result = calc
//!     .calculate(&SelfEmploymentInput {
//!         net_profit: dec!(60000),
//!         w2_wages: dec!(0),
//!         filing_status: FilingStatus::Single,
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.net_earnings, dec!(55410));
//! assert_eq!(result.self_employment_tax, dec!(8477.73));
//! assert_eq!(result.se_tax_deduction, dec!(4238.865));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::BracketSchedule;
use crate::calculations::common::{non_negative, ratio, round_half_up};
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::config::{ConfigError, build_schedule, check_non_negative, check_positive, check_rate};
use crate::format::Locale;
use crate::models::{
    BracketSpec, FilingStatus, PerFilingStatus, Report, ValidationError,
    check_amount as require,
};

/// Schedule code of the federal rate table used for `status`.
///
/// Qualifying surviving spouses share the married-filing-jointly table.
pub fn schedule_code(status: FilingStatus) -> &'static str {
    match status {
        FilingStatus::Single => "US-X",
        FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingSurvivingSpouse => "US-Y-1",
        FilingStatus::MarriedFilingSeparately => "US-Y-2",
        FilingStatus::HeadOfHousehold => "US-Z",
    }
}

/// Rates and limits for the self-employment calculator.
///
/// The defaults are the 2025 IRS values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfEmploymentConfig {
    /// Maximum earnings subject to social security tax.
    pub ss_wage_max: Decimal,

    /// Combined employer and employee social security rate.
    pub ss_tax_rate: Decimal,

    /// Combined employer and employee Medicare rate.
    pub medicare_tax_rate: Decimal,

    /// Share of net profit subject to SE tax.
    pub net_earnings_factor: Decimal,

    /// Deductible share of the SE tax.
    pub deduction_factor: Decimal,

    /// Net profit at or below this amount owes no SE tax.
    pub min_se_threshold: Decimal,

    pub additional_medicare_rate: Decimal,
    pub additional_medicare_thresholds: PerFilingStatus<Decimal>,
    pub standard_deductions: PerFilingStatus<Decimal>,
    pub income_brackets: PerFilingStatus<Vec<BracketSpec>>,

    /// Number of estimated payments per year.
    pub quarters: u32,
}

fn brackets(bounds: [i64; 7]) -> Vec<BracketSpec> {
    const RATES: [i64; 7] = [10, 12, 22, 24, 32, 35, 37];
    bounds
        .iter()
        .zip(RATES)
        .map(|(&bound, rate)| BracketSpec::flat(Decimal::from(bound), Decimal::new(rate, 2)))
        .collect()
}

impl Default for SelfEmploymentConfig {
    fn default() -> Self {
        let joint = brackets([0, 23_850, 96_950, 206_700, 394_600, 501_050, 751_600]);
        Self {
            ss_wage_max: Decimal::from(176_100),
            ss_tax_rate: Decimal::new(124, 3),
            medicare_tax_rate: Decimal::new(29, 3),
            net_earnings_factor: Decimal::new(9235, 4),
            deduction_factor: Decimal::new(50, 2),
            min_se_threshold: Decimal::from(400),
            additional_medicare_rate: Decimal::new(9, 3),
            additional_medicare_thresholds: PerFilingStatus {
                single: Decimal::from(200_000),
                married_filing_jointly: Decimal::from(250_000),
                married_filing_separately: Decimal::from(125_000),
                head_of_household: Decimal::from(200_000),
                qualifying_surviving_spouse: Decimal::from(200_000),
            },
            standard_deductions: PerFilingStatus {
                single: Decimal::from(15_000),
                married_filing_jointly: Decimal::from(30_000),
                married_filing_separately: Decimal::from(15_000),
                head_of_household: Decimal::from(22_500),
                qualifying_surviving_spouse: Decimal::from(30_000),
            },
            income_brackets: PerFilingStatus {
                single: brackets([0, 11_925, 48_475, 103_350, 197_300, 250_525, 626_350]),
                married_filing_jointly: joint.clone(),
                married_filing_separately: brackets([
                    0, 11_925, 48_475, 103_350, 197_300, 250_525, 375_800,
                ]),
                head_of_household: brackets([0, 17_000, 64_850, 103_350, 197_300, 250_500, 626_350]),
                qualifying_surviving_spouse: joint,
            },
            quarters: 4,
        }
    }
}

impl SelfEmploymentConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `net_earnings_factor` is not in (0, 1]
    /// - any rate is not in [0, 1]
    /// - `ss_wage_max` is not positive
    /// - `min_se_threshold` or a threshold/deduction is negative
    /// - `quarters` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("net_earnings_factor", self.net_earnings_factor)?;
        check_rate("net_earnings_factor", self.net_earnings_factor)?;
        check_rate("ss_tax_rate", self.ss_tax_rate)?;
        check_rate("medicare_tax_rate", self.medicare_tax_rate)?;
        check_rate("deduction_factor", self.deduction_factor)?;
        check_rate("additional_medicare_rate", self.additional_medicare_rate)?;
        check_positive("ss_wage_max", self.ss_wage_max)?;
        check_non_negative("min_se_threshold", self.min_se_threshold)?;
        self.additional_medicare_thresholds
            .try_map(|_, &value| check_non_negative("additional_medicare_thresholds", value))?;
        self.standard_deductions
            .try_map(|_, &value| check_non_negative("standard_deductions", value))?;
        check_positive("quarters", Decimal::from(self.quarters))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentInput {
    pub net_profit: Decimal,
    /// Wages already subject to social security and Medicare withholding.
    pub w2_wages: Decimal,
    pub filing_status: FilingStatus,
}

/// Worksheet lines plus the income tax estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentResult {
    /// `true` when net profit was at or below the minimum threshold.
    pub below_threshold: bool,
    pub net_earnings: Decimal,
    pub medicare_tax: Decimal,
    pub ss_taxable_earnings: Decimal,
    pub social_security_tax: Decimal,
    pub self_employment_tax: Decimal,
    pub additional_medicare_tax: Decimal,
    pub se_tax_deduction: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub total_tax: Decimal,
    /// Rounded to cents.
    pub quarterly_payment: Decimal,
    /// Total tax over profit plus wages.
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

impl SelfEmploymentResult {
    pub fn report(&self) -> Report {
        Report::new("US self-employment tax", Locale::UsEnglish)
            .money("Net earnings", self.net_earnings)
            .money("Social security tax", self.social_security_tax)
            .money("Medicare tax", self.medicare_tax)
            .money("Self-employment tax", self.self_employment_tax)
            .money("Additional Medicare tax", self.additional_medicare_tax)
            .money("SE tax deduction", self.se_tax_deduction)
            .money("Taxable income", self.taxable_income)
            .money("Income tax", self.income_tax)
            .money("Total tax", self.total_tax)
            .money("Quarterly payment", self.quarterly_payment)
            .rate("Effective rate", self.effective_rate)
            .rate("Marginal rate", self.marginal_rate)
    }
}

/// Calculator for self-employment tax and the federal income tax estimate.
#[derive(Debug, Clone)]
pub struct SelfEmploymentTax {
    config: SelfEmploymentConfig,
    schedules: PerFilingStatus<BracketSchedule>,
}

const STEPS: &[Step<SelfEmploymentTax, SelfEmploymentInput, SelfEmploymentResult>] = &[
    Step::new("net_earnings", net_earnings),
    Step::new("medicare_tax", medicare_tax),
    Step::new("social_security_tax", social_security_tax),
    Step::new("additional_medicare_tax", additional_medicare_tax),
    Step::new("se_tax_deduction", se_tax_deduction),
    Step::new("income_tax", income_tax),
    Step::new("totals", totals),
];

impl SelfEmploymentTax {
    pub fn new(config: SelfEmploymentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let schedules = config
            .income_brackets
            .try_map(|status, brackets| build_schedule(schedule_code(status), brackets))?;
        Ok(Self { config, schedules })
    }

    pub fn config(&self) -> &SelfEmploymentConfig {
        &self.config
    }

    pub fn schedule(
        &self,
        status: FilingStatus,
    ) -> &BracketSchedule {
        self.schedules.get(status)
    }
}

/// Worksheet line 2, skipped entirely at or below the minimum threshold.
fn net_earnings(
    calc: &SelfEmploymentTax,
    input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    if input.net_profit <= calc.config.min_se_threshold {
        warn!(
            net_profit = %input.net_profit,
            threshold = %calc.config.min_se_threshold,
            "SE income at or below minimum threshold; no SE tax due"
        );
        result.below_threshold = true;
        return;
    }
    result.net_earnings = input.net_profit * calc.config.net_earnings_factor;
}

fn medicare_tax(
    calc: &SelfEmploymentTax,
    _input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    result.medicare_tax = result.net_earnings * calc.config.medicare_tax_rate;
}

/// Lines 4 to 6: social security tax on the part of the wage base W-2
/// wages have not used up.
fn social_security_tax(
    calc: &SelfEmploymentTax,
    input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    let remaining = calc.config.ss_wage_max - input.w2_wages;
    if remaining <= Decimal::ZERO {
        warn!(
            ss_wage_max = %calc.config.ss_wage_max,
            wages = %input.w2_wages,
            "Wages exceed or equal SS wage maximum; no SS tax on SE income"
        );
    }
    result.ss_taxable_earnings = result.net_earnings.min(non_negative(remaining));
    result.social_security_tax = result.ss_taxable_earnings * calc.config.ss_tax_rate;
    result.self_employment_tax = result.medicare_tax + result.social_security_tax;
}

fn additional_medicare_tax(
    calc: &SelfEmploymentTax,
    input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    let threshold = *calc
        .config
        .additional_medicare_thresholds
        .get(input.filing_status);
    let remaining_threshold = non_negative(threshold - input.w2_wages);
    let excess = non_negative(result.net_earnings - remaining_threshold);
    result.additional_medicare_tax = excess * calc.config.additional_medicare_rate;
}

fn se_tax_deduction(
    calc: &SelfEmploymentTax,
    _input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    result.se_tax_deduction = result.self_employment_tax * calc.config.deduction_factor;
}

fn income_tax(
    calc: &SelfEmploymentTax,
    input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    let standard_deduction = *calc.config.standard_deductions.get(input.filing_status);
    result.taxable_income = non_negative(
        input.net_profit + input.w2_wages - result.se_tax_deduction - standard_deduction,
    );
    let schedule = calc.schedule(input.filing_status);
    result.income_tax = schedule.tax(result.taxable_income);
    result.marginal_rate = schedule.marginal_rate(result.taxable_income);
}

fn totals(
    calc: &SelfEmploymentTax,
    input: &SelfEmploymentInput,
    result: &mut SelfEmploymentResult,
) {
    result.total_tax =
        result.self_employment_tax + result.additional_medicare_tax + result.income_tax;
    result.quarterly_payment =
        round_half_up(result.total_tax / Decimal::from(calc.config.quarters));
    result.effective_rate = ratio(result.total_tax, input.net_profit + input.w2_wages);
}

impl Calculator for SelfEmploymentTax {
    type Input = SelfEmploymentInput;
    type Output = SelfEmploymentResult;

    fn name(&self) -> &'static str {
        "us-self-employment"
    }

    fn validate(
        &self,
        input: &SelfEmploymentInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "net_profit", input.net_profit);
        require(&mut errors, "w2_wages", input.w2_wages);
        errors
    }

    fn compute(
        &self,
        input: &SelfEmploymentInput,
    ) -> SelfEmploymentResult {
        Pipeline::new(STEPS).run(self, input)
    }

    fn steps(&self) -> Vec<&'static str> {
        Pipeline::new(STEPS).step_names()
    }
}
