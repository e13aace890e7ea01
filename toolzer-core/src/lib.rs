//! Tax and benefit calculators for Germany, the Netherlands, Portugal, Spain
//! and the United States.
//!
//! Every calculator is a pure function from an input record to a result
//! record, driven by a rate configuration that is checked once up front.
//! [`CalculatorSet`] bundles one calculator per jurisdiction behind a single
//! `calculate` entry point.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolzer_core::calculations::jurisdictions::{Residency, SpainCapitalGainsInput};
//! use toolzer_core::{CalculationInput, CalculationResult, CalculatorSet};
//!
//! let calculators = CalculatorSet::with_defaults().unwrap();
//! let result = calculators
//!     .calculate(&CalculationInput::SpainCapitalGains(SpainCapitalGainsInput {
//!         purchase_price: dec!(200000),
//!         sale_price: dec!(300000),
//!         expenses: dec!(5000),
//!         residency: Residency::Eu,
//!         withholding_applied: true,
//!     }))
//!     .unwrap();
//!
//! let CalculationResult::SpainCapitalGains(gains) = result else {
//!     unreachable!();
//! };
//! assert_eq!(gains.net_due, dec!(9050));
//! ```

pub mod calculations;
pub mod config;
pub mod format;
pub mod models;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::Calculator;
use crate::calculations::jurisdictions::{
    GermanyBenefits, GermanyBenefitsInput, GermanyBenefitsResult, GermanyIncomeInput,
    GermanyIncomeResult, GermanyIncomeTax, NetherlandsIncomeInput, NetherlandsIncomeResult,
    NetherlandsIncomeTax, PortugalNhr, PortugalNhrInput, PortugalNhrResult, SelfEmploymentInput,
    SelfEmploymentResult, SelfEmploymentTax, SpainCapitalGains, SpainCapitalGainsInput,
    SpainCapitalGainsResult, VehicleImport, VehicleImportInput, VehicleImportResult,
};
pub use config::{ConfigError, RatesConfig};
pub use models::*;

/// Input for one calculation, tagged by calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationInput {
    GermanyIncome(GermanyIncomeInput),
    GermanyBenefits(GermanyBenefitsInput),
    VehicleImport(VehicleImportInput),
    NetherlandsIncome(NetherlandsIncomeInput),
    PortugalNhr(PortugalNhrInput),
    SpainCapitalGains(SpainCapitalGainsInput),
    SelfEmployment(SelfEmploymentInput),
}

/// Result of one calculation, matching the [`CalculationInput`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationResult {
    GermanyIncome(GermanyIncomeResult),
    GermanyBenefits(GermanyBenefitsResult),
    VehicleImport(VehicleImportResult),
    NetherlandsIncome(NetherlandsIncomeResult),
    PortugalNhr(PortugalNhrResult),
    SpainCapitalGains(SpainCapitalGainsResult),
    SelfEmployment(SelfEmploymentResult),
}

impl CalculationResult {
    /// Presentation view of the result.
    pub fn report(&self) -> Report {
        match self {
            Self::GermanyIncome(result) => result.report(),
            Self::GermanyBenefits(result) => result.report(),
            Self::VehicleImport(result) => result.report(),
            Self::NetherlandsIncome(result) => result.report(),
            Self::PortugalNhr(result) => result.report(),
            Self::SpainCapitalGains(result) => result.report(),
            Self::SelfEmployment(result) => result.report(),
        }
    }
}

/// One configured calculator per jurisdiction.
#[derive(Debug, Clone)]
pub struct CalculatorSet {
    germany_income: GermanyIncomeTax,
    germany_benefits: GermanyBenefits,
    vehicle_import: VehicleImport,
    netherlands: NetherlandsIncomeTax,
    portugal: PortugalNhr,
    spain: SpainCapitalGains,
    united_states: SelfEmploymentTax,
}

impl CalculatorSet {
    /// Builds every calculator, failing on the first invalid table or rate.
    pub fn new(config: RatesConfig) -> Result<Self, ConfigError> {
        let set = Self {
            germany_income: GermanyIncomeTax::new(config.germany_income)?,
            germany_benefits: GermanyBenefits::new(config.germany_benefits)?,
            vehicle_import: VehicleImport::new(config.vehicle_import)?,
            netherlands: NetherlandsIncomeTax::new(config.netherlands)?,
            portugal: PortugalNhr::new(config.portugal)?,
            spain: SpainCapitalGains::new(config.spain)?,
            united_states: SelfEmploymentTax::new(config.united_states)?,
        };
        debug!("calculator set ready");
        Ok(set)
    }

    /// Calculators with the built-in 2025 rates.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(RatesConfig::default())
    }

    /// Validates `input` and runs the matching calculator.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, ValidationErrors> {
        Ok(match input {
            CalculationInput::GermanyIncome(input) => {
                CalculationResult::GermanyIncome(self.germany_income.calculate(input)?)
            }
            CalculationInput::GermanyBenefits(input) => {
                CalculationResult::GermanyBenefits(self.germany_benefits.calculate(input)?)
            }
            CalculationInput::VehicleImport(input) => {
                CalculationResult::VehicleImport(self.vehicle_import.calculate(input)?)
            }
            CalculationInput::NetherlandsIncome(input) => {
                CalculationResult::NetherlandsIncome(self.netherlands.calculate(input)?)
            }
            CalculationInput::PortugalNhr(input) => {
                CalculationResult::PortugalNhr(self.portugal.calculate(input)?)
            }
            CalculationInput::SpainCapitalGains(input) => {
                CalculationResult::SpainCapitalGains(self.spain.calculate(input)?)
            }
            CalculationInput::SelfEmployment(input) => {
                CalculationResult::SelfEmployment(self.united_states.calculate(input)?)
            }
        })
    }

    pub fn germany_income(&self) -> &GermanyIncomeTax {
        &self.germany_income
    }

    pub fn netherlands(&self) -> &NetherlandsIncomeTax {
        &self.netherlands
    }

    pub fn portugal(&self) -> &PortugalNhr {
        &self.portugal
    }

    pub fn united_states(&self) -> &SelfEmploymentTax {
        &self.united_states
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::jurisdictions::{Assessment, ElterngeldVariant, FederalState};

    fn calculators() -> CalculatorSet {
        CalculatorSet::with_defaults().unwrap()
    }

    #[test]
    fn dispatches_to_matching_calculator() {
        let result = calculators()
            .calculate(&CalculationInput::GermanyBenefits(GermanyBenefitsInput {
                children: 2,
                net_monthly_income: dec!(2000),
                variant: ElterngeldVariant::Basic,
                partner_participates: false,
            }))
            .unwrap();

        let CalculationResult::GermanyBenefits(benefits) = result else {
            panic!("expected a benefits result, got {result:?}");
        };
        assert_eq!(benefits.kindergeld_monthly, dec!(510));
        assert_eq!(benefits.elterngeld_monthly, dec!(1300));
    }

    #[test]
    fn validation_errors_pass_through() {
        let errors = calculators()
            .calculate(&CalculationInput::GermanyIncome(GermanyIncomeInput {
                gross_income: dec!(-1),
                assessment: Assessment::Single,
                church_member: false,
                state: FederalState::Berlin,
                childless: false,
            }))
            .unwrap_err();

        assert!(errors.has_field("gross_income"));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let mut config = RatesConfig::default();
        config.netherlands.brackets.clear();

        let error = CalculatorSet::new(config).unwrap_err();

        assert!(matches!(error, ConfigError::Schedule { ref name, .. } if name == "NL"));
    }

    #[test]
    fn report_dispatches_per_variant() {
        let result = calculators()
            .calculate(&CalculationInput::SelfEmployment(SelfEmploymentInput {
                net_profit: dec!(60000),
                w2_wages: dec!(0),
                filing_status: FilingStatus::Single,
            }))
            .unwrap();

        assert_eq!(result.report().title, "US self-employment tax");
    }
}
