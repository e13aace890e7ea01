//! German income tax and employee social contributions.
//!
//! # Steps
//!
//! | Step                   | Rule |
//! |------------------------|------|
//! | `taxable_income`       | Gross income minus the basic allowance (doubled for joint assessment) |
//! | `income_tax`           | Tariff schedule; joint assessment uses splitting, 2 × tax(gross / 2) |
//! | `solidarity_surcharge` | 5.5% of income tax once it exceeds the assessment threshold, limited by the mitigation zone |
//! | `church_tax`           | 8% (Bavaria, Baden-Württemberg) or 9% of income tax, members only |
//! | `social_contributions` | Pension, unemployment, health and care, each on gross capped at its ceiling; joint assessment caps each spouse's half |
//! | `totals`               | Totals, net income, effective and marginal rates |
//!
//! The tariff's linear zones model the progressive interpolation between 14%
//! and 42%; the basic allowance is the tariff's zero-rate band.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolzer_core::calculations::Calculator;
//! use toolzer_core::calculations::jurisdictions::{
//!     Assessment, FederalState, GermanyIncomeConfig, GermanyIncomeInput, GermanyIncomeTax,
//! };
//!
//! let calculator = GermanyIncomeTax::new(GermanyIncomeConfig::default()).unwrap();
//! let input = GermanyIncomeInput {
//!     gross_income: dec!(60000),
//!     assessment: Assessment::Single,
//!     church_member: false,
//!     state: FederalState::Berlin,
//!     childless: false,
//! };
//!
//! let result = calculator.calculate(&input).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(47904));
//! assert_eq!(result.solidarity_surcharge, dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{capped_contribution, non_negative, ratio};
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::calculations::BracketSchedule;
use crate::config::{ConfigError, build_schedule, check_non_negative, check_rate};
use crate::format::Locale;
use crate::models::{BracketSpec, Report, ValidationError, check_amount as require};

/// Whether spouses are assessed individually or jointly (splitting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assessment {
    Single,
    Joint,
}

/// German federal state, used for the church tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederalState {
    BadenWuerttemberg,
    Bavaria,
    Berlin,
    Brandenburg,
    Bremen,
    Hamburg,
    Hesse,
    LowerSaxony,
    MecklenburgVorpommern,
    NorthRhineWestphalia,
    RhinelandPalatinate,
    Saarland,
    Saxony,
    SaxonyAnhalt,
    SchleswigHolstein,
    Thuringia,
}

impl FederalState {
    pub const ALL: [FederalState; 16] = [
        Self::BadenWuerttemberg,
        Self::Bavaria,
        Self::Berlin,
        Self::Brandenburg,
        Self::Bremen,
        Self::Hamburg,
        Self::Hesse,
        Self::LowerSaxony,
        Self::MecklenburgVorpommern,
        Self::NorthRhineWestphalia,
        Self::RhinelandPalatinate,
        Self::Saarland,
        Self::Saxony,
        Self::SaxonyAnhalt,
        Self::SchleswigHolstein,
        Self::Thuringia,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadenWuerttemberg => "BW",
            Self::Bavaria => "BY",
            Self::Berlin => "BE",
            Self::Brandenburg => "BB",
            Self::Bremen => "HB",
            Self::Hamburg => "HH",
            Self::Hesse => "HE",
            Self::LowerSaxony => "NI",
            Self::MecklenburgVorpommern => "MV",
            Self::NorthRhineWestphalia => "NW",
            Self::RhinelandPalatinate => "RP",
            Self::Saarland => "SL",
            Self::Saxony => "SN",
            Self::SaxonyAnhalt => "ST",
            Self::SchleswigHolstein => "SH",
            Self::Thuringia => "TH",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    /// Bavaria and Baden-Württemberg levy the reduced church tax rate.
    fn has_reduced_church_tax(&self) -> bool {
        matches!(self, Self::BadenWuerttemberg | Self::Bavaria)
    }
}

/// Solidarity surcharge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidarityConfig {
    pub rate: Decimal,
    /// Income tax above which the surcharge starts (individual assessment).
    pub threshold_single: Decimal,
    /// Income tax above which the surcharge starts (joint assessment).
    pub threshold_joint: Decimal,
    /// Share of the income tax above the threshold that caps the surcharge.
    pub mitigation_rate: Decimal,
}

impl Default for SolidarityConfig {
    fn default() -> Self {
        Self {
            rate: Decimal::new(55, 3),
            threshold_single: Decimal::from(19_950),
            threshold_joint: Decimal::from(39_900),
            mitigation_rate: Decimal::new(119, 3),
        }
    }
}

/// Employee share of statutory social contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionConfig {
    pub pension_rate: Decimal,
    pub unemployment_rate: Decimal,
    /// Contribution ceiling for pension and unemployment insurance.
    pub pension_ceiling: Decimal,
    /// General health rate plus half the average additional contribution.
    pub health_rate: Decimal,
    pub care_rate: Decimal,
    pub care_childless_surcharge: Decimal,
    /// Contribution ceiling for health and care insurance.
    pub health_ceiling: Decimal,
}

impl Default for ContributionConfig {
    fn default() -> Self {
        Self {
            pension_rate: Decimal::new(93, 3),
            unemployment_rate: Decimal::new(13, 3),
            pension_ceiling: Decimal::from(96_600),
            health_rate: Decimal::new(855, 4),
            care_rate: Decimal::new(18, 3),
            care_childless_surcharge: Decimal::new(6, 3),
            health_ceiling: Decimal::from(66_150),
        }
    }
}

/// German income tax configuration (2025 tariff).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GermanyIncomeConfig {
    /// Tariff applied to income per assessed person; its leading zero-rate
    /// band is the basic allowance.
    pub brackets: Vec<BracketSpec>,
    pub solidarity: SolidarityConfig,
    pub church_tax_rate_reduced: Decimal,
    pub church_tax_rate_standard: Decimal,
    pub contributions: ContributionConfig,
}

impl Default for GermanyIncomeConfig {
    fn default() -> Self {
        Self {
            brackets: vec![
                BracketSpec::flat(Decimal::ZERO, Decimal::ZERO),
                BracketSpec::linear(
                    Decimal::from(12_096),
                    Decimal::new(14, 2),
                    Decimal::new(24, 2),
                ),
                BracketSpec::linear(
                    Decimal::from(17_443),
                    Decimal::new(24, 2),
                    Decimal::new(42, 2),
                ),
                BracketSpec::flat(Decimal::from(68_429), Decimal::new(42, 2)),
                BracketSpec::flat(Decimal::from(277_825), Decimal::new(45, 2)),
            ],
            solidarity: SolidarityConfig::default(),
            church_tax_rate_reduced: Decimal::new(8, 2),
            church_tax_rate_standard: Decimal::new(9, 2),
            contributions: ContributionConfig::default(),
        }
    }
}

impl GermanyIncomeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_rate("solidarity.rate", self.solidarity.rate)?;
        check_rate("solidarity.mitigation_rate", self.solidarity.mitigation_rate)?;
        check_non_negative("solidarity.threshold_single", self.solidarity.threshold_single)?;
        check_non_negative("solidarity.threshold_joint", self.solidarity.threshold_joint)?;
        check_rate("church_tax_rate_reduced", self.church_tax_rate_reduced)?;
        check_rate("church_tax_rate_standard", self.church_tax_rate_standard)?;

        let c = &self.contributions;
        check_rate("contributions.pension_rate", c.pension_rate)?;
        check_rate("contributions.unemployment_rate", c.unemployment_rate)?;
        check_rate("contributions.health_rate", c.health_rate)?;
        check_rate("contributions.care_rate", c.care_rate)?;
        check_rate("contributions.care_childless_surcharge", c.care_childless_surcharge)?;
        check_non_negative("contributions.pension_ceiling", c.pension_ceiling)?;
        check_non_negative("contributions.health_ceiling", c.health_ceiling)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermanyIncomeInput {
    /// Annual gross employment income.
    pub gross_income: Decimal,
    pub assessment: Assessment,
    pub church_member: bool,
    pub state: FederalState,
    /// Childless employees pay the care insurance surcharge.
    pub childless: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermanyIncomeResult {
    pub gross_income: Decimal,
    pub basic_allowance: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub solidarity_surcharge: Decimal,
    pub church_tax: Decimal,
    pub pension_contribution: Decimal,
    pub unemployment_contribution: Decimal,
    pub health_contribution: Decimal,
    pub care_contribution: Decimal,
    /// Income tax plus surcharge plus church tax.
    pub total_tax: Decimal,
    pub total_contributions: Decimal,
    pub net_income: Decimal,
    /// Taxes and contributions over gross income.
    pub effective_rate: Decimal,
    /// Marginal income tax rate at the assessed income.
    pub marginal_rate: Decimal,
}

impl GermanyIncomeResult {
    pub fn report(&self) -> Report {
        Report::new("Germany income tax", Locale::German)
            .money("Gross income", self.gross_income)
            .money("Basic allowance", self.basic_allowance)
            .money("Taxable income", self.taxable_income)
            .money("Income tax", self.income_tax)
            .money("Solidarity surcharge", self.solidarity_surcharge)
            .money("Church tax", self.church_tax)
            .money("Pension insurance", self.pension_contribution)
            .money("Unemployment insurance", self.unemployment_contribution)
            .money("Health insurance", self.health_contribution)
            .money("Care insurance", self.care_contribution)
            .money("Total tax", self.total_tax)
            .money("Total contributions", self.total_contributions)
            .money("Net income", self.net_income)
            .rate("Effective rate", self.effective_rate)
            .rate("Marginal rate", self.marginal_rate)
    }
}

/// German income tax calculator.
#[derive(Debug, Clone)]
pub struct GermanyIncomeTax {
    config: GermanyIncomeConfig,
    schedule: BracketSchedule,
}

const STEPS: &[Step<GermanyIncomeTax, GermanyIncomeInput, GermanyIncomeResult>] = &[
    Step::new("taxable_income", taxable_income),
    Step::new("income_tax", income_tax),
    Step::new("solidarity_surcharge", solidarity_surcharge),
    Step::new("church_tax", church_tax),
    Step::new("social_contributions", social_contributions),
    Step::new("totals", totals),
];

impl GermanyIncomeTax {
    /// Checks the configuration and builds the tariff schedule.
    pub fn new(config: GermanyIncomeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let schedule = build_schedule("DE", &config.brackets)?;
        Ok(Self { config, schedule })
    }

    pub fn config(&self) -> &GermanyIncomeConfig {
        &self.config
    }

    pub fn schedule(&self) -> &BracketSchedule {
        &self.schedule
    }

    fn persons(assessment: Assessment) -> Decimal {
        match assessment {
            Assessment::Single => Decimal::ONE,
            Assessment::Joint => Decimal::TWO,
        }
    }
}

fn taxable_income(
    calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    result.gross_income = input.gross_income;
    result.basic_allowance =
        calc.schedule.tax_free_amount() * GermanyIncomeTax::persons(input.assessment);
    result.taxable_income = non_negative(input.gross_income - result.basic_allowance);
}

fn income_tax(
    calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    let persons = GermanyIncomeTax::persons(input.assessment);
    let per_person = input.gross_income / persons;
    result.income_tax = calc.schedule.tax(per_person) * persons;
    result.marginal_rate = calc.schedule.marginal_rate(per_person);
}

fn solidarity_surcharge(
    calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    let soli = &calc.config.solidarity;
    let threshold = match input.assessment {
        Assessment::Single => soli.threshold_single,
        Assessment::Joint => soli.threshold_joint,
    };
    if result.income_tax <= threshold {
        return;
    }
    let full = result.income_tax * soli.rate;
    let mitigated = (result.income_tax - threshold) * soli.mitigation_rate;
    result.solidarity_surcharge = full.min(mitigated);
}

fn church_tax(
    calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    if !input.church_member {
        return;
    }
    let rate = if input.state.has_reduced_church_tax() {
        calc.config.church_tax_rate_reduced
    } else {
        calc.config.church_tax_rate_standard
    };
    result.church_tax = result.income_tax * rate;
}

fn social_contributions(
    calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    let c = &calc.config.contributions;
    // Joint gross is split evenly between two earners, as for the tariff.
    let persons = GermanyIncomeTax::persons(input.assessment);
    let gross = input.gross_income / persons;
    let care_rate = if input.childless {
        c.care_rate + c.care_childless_surcharge
    } else {
        c.care_rate
    };

    result.pension_contribution =
        capped_contribution(gross, c.pension_ceiling, c.pension_rate) * persons;
    result.unemployment_contribution =
        capped_contribution(gross, c.pension_ceiling, c.unemployment_rate) * persons;
    result.health_contribution =
        capped_contribution(gross, c.health_ceiling, c.health_rate) * persons;
    result.care_contribution = capped_contribution(gross, c.health_ceiling, care_rate) * persons;
}

fn totals(
    _calc: &GermanyIncomeTax,
    input: &GermanyIncomeInput,
    result: &mut GermanyIncomeResult,
) {
    result.total_tax = result.income_tax + result.solidarity_surcharge + result.church_tax;
    result.total_contributions = result.pension_contribution
        + result.unemployment_contribution
        + result.health_contribution
        + result.care_contribution;
    let deductions = result.total_tax + result.total_contributions;
    result.net_income = input.gross_income - deductions;
    result.effective_rate = ratio(deductions, input.gross_income);
}

impl Calculator for GermanyIncomeTax {
    type Input = GermanyIncomeInput;
    type Output = GermanyIncomeResult;

    fn name(&self) -> &'static str {
        "de-income"
    }

    fn validate(
        &self,
        input: &GermanyIncomeInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "gross_income", input.gross_income);
        errors
    }

    fn compute(
        &self,
        input: &GermanyIncomeInput,
    ) -> GermanyIncomeResult {
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

    fn calculator() -> GermanyIncomeTax {
        GermanyIncomeTax::new(GermanyIncomeConfig::default()).unwrap()
    }

    fn input(gross_income: Decimal) -> GermanyIncomeInput {
        GermanyIncomeInput {
            gross_income,
            assessment: Assessment::Single,
            church_member: false,
            state: FederalState::Berlin,
            childless: false,
        }
    }

    fn assert_close(
        actual: Decimal,
        expected: Decimal,
    ) {
        assert!(
            (actual - expected).abs() < dec!(0.01),
            "expected {expected}, got {actual}"
        );
    }

    // =========================================================================
    // income tax tests
    // =========================================================================

    #[test]
    fn single_filer_60000_without_church_tax() {
        let result = calculator().calculate(&input(dec!(60000))).unwrap();

        assert_eq!(result.basic_allowance, dec!(12096));
        assert_eq!(result.taxable_income, dec!(47904));
        // 5,347 × 19% + 42,557 × 24% + 18% × 42,557² / (2 × 50,986)
        assert_close(result.income_tax, dec!(14426.54));
        assert_eq!(result.solidarity_surcharge, dec!(0));
        assert_eq!(result.church_tax, dec!(0));
        assert!(result.marginal_rate > dec!(0.24) && result.marginal_rate < dec!(0.42));
    }

    #[test]
    fn income_within_allowance_owes_no_tax() {
        let result = calculator().calculate(&input(dec!(12000))).unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.income_tax, dec!(0));
        assert_eq!(result.marginal_rate, dec!(0));
    }

    #[test]
    fn joint_assessment_uses_splitting() {
        let calc = calculator();
        let single = calc.calculate(&input(dec!(60000))).unwrap();
        let joint = calc
            .calculate(&GermanyIncomeInput {
                assessment: Assessment::Joint,
                ..input(dec!(120000))
            })
            .unwrap();

        assert_eq!(joint.income_tax, single.income_tax * dec!(2));
        assert_eq!(joint.basic_allowance, dec!(24192));
        assert_eq!(joint.taxable_income, dec!(95808));
    }

    // =========================================================================
    // solidarity surcharge tests
    // =========================================================================

    #[test]
    fn solidarity_surcharge_is_mitigated_just_above_threshold() {
        let calc = calculator();
        let result = calc.calculate(&input(dec!(75000))).unwrap();

        assert!(result.income_tax > dec!(19950));
        let mitigated = (result.income_tax - dec!(19950)) * dec!(0.119);
        assert_eq!(result.solidarity_surcharge, mitigated.min(result.income_tax * dec!(0.055)));
        assert!(result.solidarity_surcharge < result.income_tax * dec!(0.055));
    }

    #[test]
    fn solidarity_surcharge_is_full_rate_for_high_incomes() {
        let result = calculator().calculate(&input(dec!(300000))).unwrap();

        assert_eq!(result.solidarity_surcharge, result.income_tax * dec!(0.055));
    }

    // =========================================================================
    // church tax tests
    // =========================================================================

    #[test]
    fn church_tax_rate_depends_on_state() {
        let calc = calculator();
        let berlin = calc
            .calculate(&GermanyIncomeInput {
                church_member: true,
                ..input(dec!(60000))
            })
            .unwrap();
        let bavaria = calc
            .calculate(&GermanyIncomeInput {
                church_member: true,
                state: FederalState::Bavaria,
                ..input(dec!(60000))
            })
            .unwrap();

        assert_eq!(berlin.church_tax, berlin.income_tax * dec!(0.09));
        assert_eq!(bavaria.church_tax, bavaria.income_tax * dec!(0.08));
    }

    // =========================================================================
    // contribution tests
    // =========================================================================

    #[test]
    fn contributions_below_ceilings() {
        let result = calculator().calculate(&input(dec!(60000))).unwrap();

        assert_eq!(result.pension_contribution, dec!(5580));
        assert_eq!(result.unemployment_contribution, dec!(780));
        assert_eq!(result.health_contribution, dec!(5130));
        assert_eq!(result.care_contribution, dec!(1080));
        assert_eq!(result.total_contributions, dec!(12570));
    }

    #[test]
    fn contributions_are_capped_above_ceilings() {
        let calc = calculator();
        let at_cap = calc.calculate(&input(dec!(96600))).unwrap();
        let above = calc.calculate(&input(dec!(250000))).unwrap();

        assert_eq!(at_cap.pension_contribution, above.pension_contribution);
        assert_eq!(at_cap.health_contribution, above.health_contribution);
        assert_eq!(above.pension_contribution, dec!(8983.8));
    }

    #[test]
    fn joint_contributions_cap_each_spouse_separately() {
        let calc = calculator();
        let single = calc.calculate(&input(dec!(60000))).unwrap();
        let joint = calc
            .calculate(&GermanyIncomeInput {
                assessment: Assessment::Joint,
                ..input(dec!(120000))
            })
            .unwrap();

        // 2 × 60,000 × 9.3%, not 96,600 × 9.3%
        assert_eq!(joint.pension_contribution, dec!(11160));
        assert_eq!(joint.total_contributions, single.total_contributions * dec!(2));
    }

    #[test]
    fn childless_surcharge_raises_care_contribution() {
        let result = calculator()
            .calculate(&GermanyIncomeInput {
                childless: true,
                ..input(dec!(60000))
            })
            .unwrap();

        assert_eq!(result.care_contribution, dec!(1440));
    }

    #[test]
    fn net_income_subtracts_taxes_and_contributions() {
        let result = calculator().calculate(&input(dec!(60000))).unwrap();

        assert_eq!(
            result.net_income,
            dec!(60000) - result.total_tax - result.total_contributions
        );
        assert_eq!(
            result.effective_rate,
            (result.total_tax + result.total_contributions) / dec!(60000)
        );
    }

    // =========================================================================
    // validation / configuration tests
    // =========================================================================

    #[test]
    fn negative_income_is_rejected() {
        let errors = calculator().calculate(&input(dec!(-1))).unwrap_err();

        assert!(errors.has_field("gross_income"));
    }

    #[test]
    fn zero_income_yields_zero_rates() {
        let result = calculator().calculate(&input(dec!(0))).unwrap();

        assert_eq!(result.effective_rate, dec!(0));
        assert_eq!(result.net_income, dec!(0));
    }

    #[test]
    fn invalid_church_rate_fails_construction() {
        let config = GermanyIncomeConfig {
            church_tax_rate_standard: dec!(9),
            ..GermanyIncomeConfig::default()
        };

        assert!(matches!(
            GermanyIncomeTax::new(config),
            Err(ConfigError::InvalidRate {
                name: "church_tax_rate_standard",
                ..
            })
        ));
    }

    #[test]
    fn federal_state_codes_round_trip() {
        for state in FederalState::ALL {
            assert_eq!(FederalState::parse(state.code()), Some(state));
        }
        assert_eq!(FederalState::parse("by"), Some(FederalState::Bavaria));
        assert_eq!(FederalState::parse("XX"), None);
    }

    #[test]
    fn steps_run_in_documented_order() {
        assert_eq!(
            calculator().steps(),
            vec![
                "taxable_income",
                "income_tax",
                "solidarity_surcharge",
                "church_tax",
                "social_contributions",
                "totals",
            ]
        );
    }
}
