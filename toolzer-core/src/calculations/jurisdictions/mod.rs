//! One calculator per jurisdiction.
//!
//! Every calculator owns a serde config with 2025 defaults, validates that
//! config once in `new`, and runs a fixed list of named steps over a fresh
//! result.

pub mod de_benefits;
pub mod de_income;
pub mod de_vehicle_import;
pub mod es_capital_gains;
pub mod nl_income;
pub mod pt_nhr;
pub mod us_self_employment;

pub use de_benefits::{
    ElterngeldVariant, GermanyBenefits, GermanyBenefitsConfig, GermanyBenefitsInput,
    GermanyBenefitsResult,
};
pub use de_income::{
    Assessment, ContributionConfig, FederalState, GermanyIncomeConfig, GermanyIncomeInput,
    GermanyIncomeResult, GermanyIncomeTax, SolidarityConfig,
};
pub use de_vehicle_import::{
    Origin, VehicleImport, VehicleImportConfig, VehicleImportInput, VehicleImportResult,
};
pub use es_capital_gains::{
    Residency, SpainCapitalGains, SpainCapitalGainsConfig, SpainCapitalGainsInput,
    SpainCapitalGainsResult,
};
pub use nl_income::{
    NetherlandsIncomeConfig, NetherlandsIncomeInput, NetherlandsIncomeResult, NetherlandsIncomeTax,
};
pub use pt_nhr::{IncomeType, PortugalNhr, PortugalNhrConfig, PortugalNhrInput, PortugalNhrResult, Regime};
pub use us_self_employment::{
    SelfEmploymentConfig, SelfEmploymentInput, SelfEmploymentResult, SelfEmploymentTax,
    schedule_code,
};
