//! Levies on importing a vehicle into Germany.
//!
//! A vehicle counts as *new* when it is at most six months past its first
//! registration or has at most 6,000 km on the clock. The calculation date is
//! an explicit input so results do not depend on the system clock.
//!
//! | Origin | Vehicle | Customs duty | VAT |
//! |--------|---------|--------------|-----|
//! | non-EU | any     | 10% of price + shipping | 19% of price + shipping + duty |
//! | EU     | new     | none | 19% of price + shipping |
//! | EU     | used    | none | none (settled in the origin country) |

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::ratio;
use crate::calculations::pipeline::{Calculator, Pipeline, Step};
use crate::config::{ConfigError, check_rate};
use crate::format::Locale;
use crate::models::{Report, ValidationError, check_amount as require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Eu,
    NonEu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleImportConfig {
    pub customs_rate: Decimal,
    pub vat_rate: Decimal,
    pub new_vehicle_max_age_months: u32,
    pub new_vehicle_max_mileage_km: u32,
}

impl Default for VehicleImportConfig {
    fn default() -> Self {
        Self {
            customs_rate: Decimal::new(10, 2),
            vat_rate: Decimal::new(19, 2),
            new_vehicle_max_age_months: 6,
            new_vehicle_max_mileage_km: 6_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImportInput {
    pub purchase_price: Decimal,
    pub shipping_cost: Decimal,
    pub origin: Origin,
    pub first_registration: NaiveDate,
    pub mileage_km: u32,
    /// Date the import is assessed on.
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImportResult {
    pub age_months: u32,
    pub is_new_vehicle: bool,
    pub customs_value: Decimal,
    pub customs_duty: Decimal,
    pub import_vat: Decimal,
    pub total_levies: Decimal,
    pub landed_cost: Decimal,
    /// Levies over price plus shipping.
    pub effective_rate: Decimal,
}

impl VehicleImportResult {
    pub fn report(&self) -> Report {
        Report::new("Germany vehicle import", Locale::German)
            .months("Vehicle age", self.age_months)
            .flag("New vehicle", self.is_new_vehicle)
            .money("Customs value", self.customs_value)
            .money("Customs duty", self.customs_duty)
            .money("Import VAT", self.import_vat)
            .money("Total levies", self.total_levies)
            .money("Landed cost", self.landed_cost)
            .rate("Effective rate", self.effective_rate)
    }
}

/// Vehicle import levy calculator.
#[derive(Debug, Clone)]
pub struct VehicleImport {
    config: VehicleImportConfig,
}

const STEPS: &[Step<VehicleImport, VehicleImportInput, VehicleImportResult>] = &[
    Step::new("vehicle_age", vehicle_age),
    Step::new("customs_duty", customs_duty),
    Step::new("import_vat", import_vat),
    Step::new("totals", totals),
];

impl VehicleImport {
    pub fn new(config: VehicleImportConfig) -> Result<Self, ConfigError> {
        check_rate("customs_rate", config.customs_rate)?;
        check_rate("vat_rate", config.vat_rate)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VehicleImportConfig {
        &self.config
    }
}

/// Whole months from `from` to `to`; a partial month does not count.
pub fn months_between(
    from: NaiveDate,
    to: NaiveDate,
) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

fn vehicle_age(
    calc: &VehicleImport,
    input: &VehicleImportInput,
    result: &mut VehicleImportResult,
) {
    result.age_months = months_between(input.first_registration, input.as_of);
    result.is_new_vehicle = result.age_months <= calc.config.new_vehicle_max_age_months
        || input.mileage_km <= calc.config.new_vehicle_max_mileage_km;
    result.customs_value = input.purchase_price + input.shipping_cost;
}

fn customs_duty(
    calc: &VehicleImport,
    input: &VehicleImportInput,
    result: &mut VehicleImportResult,
) {
    if input.origin == Origin::NonEu {
        result.customs_duty = result.customs_value * calc.config.customs_rate;
    }
}

fn import_vat(
    calc: &VehicleImport,
    input: &VehicleImportInput,
    result: &mut VehicleImportResult,
) {
    let base = match input.origin {
        Origin::NonEu => result.customs_value + result.customs_duty,
        Origin::Eu if result.is_new_vehicle => result.customs_value,
        Origin::Eu => return,
    };
    result.import_vat = base * calc.config.vat_rate;
}

fn totals(
    _calc: &VehicleImport,
    _input: &VehicleImportInput,
    result: &mut VehicleImportResult,
) {
    result.total_levies = result.customs_duty + result.import_vat;
    result.landed_cost = result.customs_value + result.total_levies;
    result.effective_rate = ratio(result.total_levies, result.customs_value);
}

impl Calculator for VehicleImport {
    type Input = VehicleImportInput;
    type Output = VehicleImportResult;

    fn name(&self) -> &'static str {
        "de-vehicle-import"
    }

    fn validate(
        &self,
        input: &VehicleImportInput,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require(&mut errors, "purchase_price", input.purchase_price);
        require(&mut errors, "shipping_cost", input.shipping_cost);
        if input.first_registration > input.as_of {
            errors.push(ValidationError::new(
                "first_registration",
                format!(
                    "must not be after the assessment date {}, got {}",
                    input.as_of, input.first_registration
                ),
            ));
        }
        errors
    }

    fn compute(
        &self,
        input: &VehicleImportInput,
    ) -> VehicleImportResult {
        Pipeline::new(STEPS).run(self, input)
    }

    fn steps(&self) -> Vec<&'static str> {
        Pipeline::new(STEPS).step_names()
    }
}
