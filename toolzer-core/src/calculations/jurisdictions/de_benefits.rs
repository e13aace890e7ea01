//! German family benefits: child benefit (Kindergeld) and parental allowance
//! (Elterngeld).
//!
//! Elterngeld rounds the monthly replacement amount to whole euros *before*
//! the floor and ceiling are applied. ElterngeldPlus pays half the basic
//! monthly amount for twice as many months.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_whole;
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::config::{ConfigError, check_non_negative, check_rate};
use crate::format::Locale;
use crate::models::{Report, ValidationError, check_amount as require};

/// Parental allowance variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElterngeldVariant {
    /// No parental allowance claimed.
    None,
    Basic,
    Plus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GermanyBenefitsConfig {
    pub kindergeld_per_child: Decimal,
    pub replacement_rate: Decimal,
    pub elterngeld_floor: Decimal,
    pub elterngeld_ceiling: Decimal,
    pub basic_months: u32,
    pub partner_months: u32,
    /// Share of the basic amount paid per ElterngeldPlus month.
    pub plus_factor: Decimal,
    pub max_children: u32,
}

impl Default for GermanyBenefitsConfig {
    fn default() -> Self {
        Self {
            kindergeld_per_child: Decimal::from(255),
            replacement_rate: Decimal::new(65, 2),
            elterngeld_floor: Decimal::from(300),
            elterngeld_ceiling: Decimal::from(1_800),
            basic_months: 12,
            partner_months: 2,
            plus_factor: Decimal::new(5, 1),
            max_children: 20,
        }
    }
}

impl GermanyBenefitsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("kindergeld_per_child", self.kindergeld_per_child)?;
        check_rate("replacement_rate", self.replacement_rate)?;
        check_rate("plus_factor", self.plus_factor)?;
        check_non_negative("elterngeld_floor", self.elterngeld_floor)?;
        if self.elterngeld_ceiling < self.elterngeld_floor {
            return Err(ConfigError::NegativeAmount {
                name: "elterngeld_ceiling - elterngeld_floor",
                value: self.elterngeld_ceiling - self.elterngeld_floor,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermanyBenefitsInput {
    pub children: u32,
    /// Average monthly net income before the birth.
    pub net_monthly_income: Decimal,
    pub variant: ElterngeldVariant,
    /// Whether the partner also takes parental leave.
    pub partner_participates: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermanyBenefitsResult {
    pub kindergeld_monthly: Decimal,
    pub kindergeld_annual: Decimal,
    /// Rounded replacement amount before the floor and ceiling.
    pub elterngeld_uncapped: Decimal,
    pub elterngeld_monthly: Decimal,
    pub elterngeld_months: u32,
    pub elterngeld_total: Decimal,
    pub total_monthly_benefits: Decimal,
}

impl GermanyBenefitsResult {
    pub fn report(&self) -> Report {
        Report::new("Germany family benefits", Locale::German)
            .money("Kindergeld per month", self.kindergeld_monthly)
            .money("Kindergeld per year", self.kindergeld_annual)
            .money("Elterngeld per month", self.elterngeld_monthly)
            .months("Elterngeld duration", self.elterngeld_months)
            .money("Elterngeld total", self.elterngeld_total)
            .money("Total monthly benefits", self.total_monthly_benefits)
    }
}

/// Kindergeld and Elterngeld calculator.
#[derive(Debug, Clone)]
pub struct GermanyBenefits {
    config: GermanyBenefitsConfig,
}

const STEPS: &[Step<GermanyBenefits, GermanyBenefitsInput, GermanyBenefitsResult>] = &[
    Step::new("kindergeld", kindergeld),
    Step::new("elterngeld", elterngeld),
    Step::new("totals", totals),
];

impl GermanyBenefits {
    pub fn new(config: GermanyBenefitsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GermanyBenefitsConfig {
        &self.config
    }
}

fn kindergeld(
    calc: &GermanyBenefits,
    input: &GermanyBenefitsInput,
    result: &mut GermanyBenefitsResult,
) {
    result.kindergeld_monthly = calc.config.kindergeld_per_child * Decimal::from(input.children);
    result.kindergeld_annual = result.kindergeld_monthly * Decimal::from(12);
}

fn elterngeld(
    calc: &GermanyBenefits,
    input: &GermanyBenefitsInput,
    result: &mut GermanyBenefitsResult,
) {
    let c = &calc.config;
    let partner_months = if input.partner_participates {
        c.partner_months
    } else {
        0
    };

    let (factor, months) = match input.variant {
        ElterngeldVariant::None => return,
        ElterngeldVariant::Basic => (Decimal::ONE, c.basic_months + partner_months),
        ElterngeldVariant::Plus => (c.plus_factor, 2 * (c.basic_months + partner_months)),
    };

    result.elterngeld_uncapped = round_whole(input.net_monthly_income * c.replacement_rate);
    let basic = result
        .elterngeld_uncapped
        .max(c.elterngeld_floor)
        .min(c.elterngeld_ceiling);
    if basic != result.elterngeld_uncapped {
        debug!(
            uncapped = %result.elterngeld_uncapped,
            capped = %basic,
            "elterngeld limited to floor/ceiling"
        );
    }

    result.elterngeld_monthly = basic * factor;
    result.elterngeld_months = months;
    result.elterngeld_total = result.elterngeld_monthly * Decimal::from(months);
}

fn totals(
    _calc: &GermanyBenefits,
    _input: &GermanyBenefitsInput,
    result: &mut GermanyBenefitsResult,
) {
    result.total_monthly_benefits = result.kindergeld_monthly + result.elterngeld_monthly;
}

impl Calculator for GermanyBenefits {
    type Input = GermanyBenefitsInput;
    type Output = GermanyBenefitsResult;

    fn name(&self) -> &'static str {
        "de-benefits"
    }

    fn validate(
        &self,
        input: &GermanyBenefitsInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "net_monthly_income", input.net_monthly_income);
        if input.children > self.config.max_children {
            errors.push(ValidationError::new(
                "children",
                format!(
                    "must be at most {}, got {}",
                    self.config.max_children, input.children
                ),
            ));
        }
        if input.variant != ElterngeldVariant::None && input.children == 0 {
            errors.push(ValidationError::new(
                "children",
                "parental allowance requires at least one child",
            ));
        }
        errors
    }

    fn compute(
        &self,
        input: &GermanyBenefitsInput,
    ) -> GermanyBenefitsResult {
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

    fn calculator() -> GermanyBenefits {
        GermanyBenefits::new(GermanyBenefitsConfig::default()).unwrap()
    }

    fn input(
        children: u32,
        net_monthly_income: Decimal,
        variant: ElterngeldVariant,
    ) -> GermanyBenefitsInput {
        GermanyBenefitsInput {
            children,
            net_monthly_income,
            variant,
            partner_participates: false,
        }
    }

    #[test]
    fn kindergeld_for_two_children() {
        let result = calculator()
            .calculate(&input(2, dec!(0), ElterngeldVariant::None))
            .unwrap();

        assert_eq!(result.kindergeld_monthly, dec!(510));
        assert_eq!(result.kindergeld_annual, dec!(6120));
        assert_eq!(result.elterngeld_monthly, dec!(0));
        assert_eq!(result.elterngeld_months, 0);
    }

    #[test]
    fn basic_elterngeld_between_floor_and_ceiling() {
        let result = calculator()
            .calculate(&input(1, dec!(2000), ElterngeldVariant::Basic))
            .unwrap();

        assert_eq!(result.elterngeld_uncapped, dec!(1300));
        assert_eq!(result.elterngeld_monthly, dec!(1300));
        assert_eq!(result.elterngeld_months, 12);
        assert_eq!(result.elterngeld_total, dec!(15600));
        assert_eq!(result.total_monthly_benefits, dec!(1555));
    }

    #[test]
    fn elterngeld_rounds_before_applying_floor() {
        // 461.53 × 65% = 299.9945 → 300
        let result = calculator()
            .calculate(&input(1, dec!(461.53), ElterngeldVariant::Basic))
            .unwrap();

        assert_eq!(result.elterngeld_uncapped, dec!(300));
        assert_eq!(result.elterngeld_monthly, dec!(300));
    }

    #[test]
    fn elterngeld_floor_applies_without_income() {
        let result = calculator()
            .calculate(&input(1, dec!(0), ElterngeldVariant::Basic))
            .unwrap();

        assert_eq!(result.elterngeld_monthly, dec!(300));
    }

    #[test]
    fn elterngeld_ceiling_caps_high_income() {
        let result = calculator()
            .calculate(&input(1, dec!(5000), ElterngeldVariant::Basic))
            .unwrap();

        assert_eq!(result.elterngeld_uncapped, dec!(3250));
        assert_eq!(result.elterngeld_monthly, dec!(1800));
    }

    #[test]
    fn elterngeld_plus_halves_amount_and_doubles_months() {
        let result = calculator()
            .calculate(&GermanyBenefitsInput {
                partner_participates: true,
                ..input(1, dec!(2000), ElterngeldVariant::Plus)
            })
            .unwrap();

        assert_eq!(result.elterngeld_monthly, dec!(650));
        assert_eq!(result.elterngeld_months, 28);
        assert_eq!(result.elterngeld_total, dec!(18200));
    }

    #[test]
    fn partner_months_extend_basic_variant() {
        let result = calculator()
            .calculate(&GermanyBenefitsInput {
                partner_participates: true,
                ..input(1, dec!(2000), ElterngeldVariant::Basic)
            })
            .unwrap();

        assert_eq!(result.elterngeld_months, 14);
    }

    #[test]
    fn validation_collects_every_error() {
        let errors = calculator()
            .calculate(&input(0, dec!(-10), ElterngeldVariant::Basic))
            .unwrap_err();

        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has_field("net_monthly_income"));
        assert!(errors.has_field("children"));
    }

    #[test]
    fn too_many_children_is_rejected() {
        let errors = calculator()
            .calculate(&input(21, dec!(0), ElterngeldVariant::None))
            .unwrap_err();

        assert_eq!(errors.messages(), vec!["children: must be at most 20, got 21"]);
    }

    #[test]
    fn ceiling_below_floor_fails_construction() {
        let config = GermanyBenefitsConfig {
            elterngeld_ceiling: dec!(100),
            ..GermanyBenefitsConfig::default()
        };

        assert!(GermanyBenefits::new(config).is_err());
    }
}
