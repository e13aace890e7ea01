//! Calculator subcommands and their mapping onto calculation inputs.

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use toolzer_core::calculations::jurisdictions::{
    Assessment, ElterngeldVariant, FederalState, GermanyBenefitsInput, GermanyIncomeInput,
    IncomeType, NetherlandsIncomeInput, Origin, PortugalNhrInput, Residency, SelfEmploymentInput,
    SpainCapitalGainsInput, VehicleImportInput,
};
use toolzer_core::{CalculationInput, FilingStatus};

use crate::utils::{parse_date, parse_decimal, parse_federal_state, parse_filing_status};

/// One calculation, named after the calculator that runs it.
#[derive(Debug, Clone, Subcommand)]
pub enum CalcCommand {
    /// German income tax, solidarity surcharge, church tax and contributions
    DeIncome(DeIncomeArgs),
    /// German Kindergeld and Elterngeld
    DeBenefits(DeBenefitsArgs),
    /// Customs duty and import VAT on a vehicle brought into Germany
    DeVehicleImport(DeVehicleImportArgs),
    /// Dutch Box 1 income tax with the 30% ruling
    NlIncome(NlIncomeArgs),
    /// Portuguese income tax under the NHR regime
    PtNhr(PtNhrArgs),
    /// Spanish capital gains tax for a property sale
    EsCapitalGains(EsCapitalGainsArgs),
    /// US self-employment tax and quarterly estimate
    UsSelfEmployment(UsSelfEmploymentArgs),
}

impl CalcCommand {
    /// Builds the calculation input. Dates left open default to today.
    pub fn to_input(&self) -> CalculationInput {
        self.to_input_as_of(Local::now().date_naive())
    }

    /// Builds the calculation input, using `today` where a date is left open.
    pub fn to_input_as_of(
        &self,
        today: NaiveDate,
    ) -> CalculationInput {
        match self {
            Self::DeIncome(args) => CalculationInput::GermanyIncome(GermanyIncomeInput {
                gross_income: args.gross,
                assessment: args.assessment.into(),
                church_member: args.church,
                state: args.state,
                childless: args.childless,
            }),
            Self::DeBenefits(args) => CalculationInput::GermanyBenefits(GermanyBenefitsInput {
                children: args.children,
                net_monthly_income: args.net_monthly,
                variant: args.variant.into(),
                partner_participates: args.partner,
            }),
            Self::DeVehicleImport(args) => CalculationInput::VehicleImport(VehicleImportInput {
                purchase_price: args.price,
                shipping_cost: args.shipping,
                origin: args.origin.into(),
                first_registration: args.first_registration,
                mileage_km: args.mileage,
                as_of: args.as_of.unwrap_or(today),
            }),
            Self::NlIncome(args) => CalculationInput::NetherlandsIncome(NetherlandsIncomeInput {
                gross_income: args.gross,
                ruling_percentage: args.ruling,
                deductions: args.deductions,
            }),
            Self::PtNhr(args) => CalculationInput::PortugalNhr(PortugalNhrInput {
                gross_income: args.gross,
                deductions: args.deductions,
                income_type: args.income_type.into(),
                nhr_status: args.nhr,
            }),
            Self::EsCapitalGains(args) => {
                CalculationInput::SpainCapitalGains(SpainCapitalGainsInput {
                    purchase_price: args.purchase,
                    sale_price: args.sale,
                    expenses: args.expenses,
                    residency: args.residency.into(),
                    withholding_applied: !args.no_withholding,
                })
            }
            Self::UsSelfEmployment(args) => CalculationInput::SelfEmployment(SelfEmploymentInput {
                net_profit: args.profit,
                w2_wages: args.wages,
                filing_status: args.filing_status,
            }),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DeIncomeArgs {
    /// Annual gross income in euros
    #[arg(long, value_parser = parse_decimal)]
    pub gross: Decimal,

    #[arg(long, value_enum, default_value_t = AssessmentArg::Single)]
    pub assessment: AssessmentArg,

    /// Member of a church that levies church tax
    #[arg(long)]
    pub church: bool,

    /// Two-letter federal state code
    #[arg(long, value_parser = parse_federal_state, default_value = "BE")]
    pub state: FederalState,

    /// Pay the childless care insurance surcharge
    #[arg(long)]
    pub childless: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DeBenefitsArgs {
    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Average monthly net income before the birth
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub net_monthly: Decimal,

    #[arg(long, value_enum, default_value_t = ElterngeldArg::None)]
    pub variant: ElterngeldArg,

    /// The partner also takes parental leave
    #[arg(long)]
    pub partner: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DeVehicleImportArgs {
    /// Purchase price in euros
    #[arg(long, value_parser = parse_decimal)]
    pub price: Decimal,

    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub shipping: Decimal,

    #[arg(long, value_enum)]
    pub origin: OriginArg,

    /// Date of first registration (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub first_registration: NaiveDate,

    #[arg(long)]
    pub mileage: u32,

    /// Assessment date (YYYY-MM-DD), today when omitted
    #[arg(long, value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Args)]
pub struct NlIncomeArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub gross: Decimal,

    /// Tax-free share of salary under the 30% ruling, in percent
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub ruling: Decimal,

    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub deductions: Decimal,
}

#[derive(Debug, Clone, Args)]
pub struct PtNhrArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub gross: Decimal,

    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub deductions: Decimal,

    #[arg(long, value_enum, default_value_t = IncomeTypeArg::Employment)]
    pub income_type: IncomeTypeArg,

    /// Holds Non-Habitual Resident status
    #[arg(long)]
    pub nhr: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EsCapitalGainsArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub purchase: Decimal,

    #[arg(long, value_parser = parse_decimal)]
    pub sale: Decimal,

    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub expenses: Decimal,

    #[arg(long, value_enum, default_value_t = ResidencyArg::Eu)]
    pub residency: ResidencyArg,

    /// The buyer did not withhold part of the price
    #[arg(long)]
    pub no_withholding: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UsSelfEmploymentArgs {
    /// Net profit from self-employment
    #[arg(long, value_parser = parse_decimal)]
    pub profit: Decimal,

    /// W-2 wages subject to social security
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub wages: Decimal,

    /// S, MFJ, MFS, HOH or QSS
    #[arg(long, value_parser = parse_filing_status, default_value = "S")]
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssessmentArg {
    Single,
    Joint,
}

impl From<AssessmentArg> for Assessment {
    fn from(arg: AssessmentArg) -> Self {
        match arg {
            AssessmentArg::Single => Assessment::Single,
            AssessmentArg::Joint => Assessment::Joint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ElterngeldArg {
    None,
    Basic,
    Plus,
}

impl From<ElterngeldArg> for ElterngeldVariant {
    fn from(arg: ElterngeldArg) -> Self {
        match arg {
            ElterngeldArg::None => ElterngeldVariant::None,
            ElterngeldArg::Basic => ElterngeldVariant::Basic,
            ElterngeldArg::Plus => ElterngeldVariant::Plus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OriginArg {
    Eu,
    NonEu,
}

impl From<OriginArg> for Origin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Eu => Origin::Eu,
            OriginArg::NonEu => Origin::NonEu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IncomeTypeArg {
    Employment,
    Pension,
    Foreign,
    Other,
}

impl From<IncomeTypeArg> for IncomeType {
    fn from(arg: IncomeTypeArg) -> Self {
        match arg {
            IncomeTypeArg::Employment => IncomeType::Employment,
            IncomeTypeArg::Pension => IncomeType::Pension,
            IncomeTypeArg::Foreign => IncomeType::ForeignIncome,
            IncomeTypeArg::Other => IncomeType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResidencyArg {
    Eu,
    NonEu,
}

impl From<ResidencyArg> for Residency {
    fn from(arg: ResidencyArg) -> Self {
        match arg {
            ResidencyArg::Eu => Residency::Eu,
            ResidencyArg::NonEu => Residency::NonEu,
        }
    }
}
