//! Rate configuration for every jurisdiction.
//!
//! Each calculator owns a serde config struct whose `Default` carries the
//! 2025 published values. A TOML rates file may override any subset of them;
//! tables and fields that are absent keep their defaults. Decimals are
//! written as quoted strings so they are read exactly.
//!
//! ```toml
//! [netherlands]
//! max_ruling_percentage = "30"
//!
//! [[netherlands.brackets]]
//! lower_bound = "0"
//! rate = "0.3582"
//! ```
//!
//! Configuration is checked when a [`CalculatorSet`](crate::CalculatorSet)
//! is built, never at calculation time.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::common::is_unit_rate;
use crate::calculations::jurisdictions::{
    GermanyBenefitsConfig, GermanyIncomeConfig, NetherlandsIncomeConfig, PortugalNhrConfig,
    SelfEmploymentConfig, SpainCapitalGainsConfig, VehicleImportConfig,
};
use crate::calculations::{BracketSchedule, ScheduleError};
use crate::models::BracketSpec;

/// Errors raised while loading or checking rate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("schedule '{name}' is invalid: {source}")]
    Schedule {
        name: String,
        #[source]
        source: ScheduleError,
    },

    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    #[error("{name} must not be negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },

    #[error("{name} must be positive, got {value}")]
    NonPositiveAmount { name: &'static str, value: Decimal },

    #[error("cannot read rates file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rates file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot write rates: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Fails unless `value` lies in `[0, 1]`.
pub(crate) fn check_rate(
    name: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if is_unit_rate(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { name, value })
    }
}

pub(crate) fn check_non_negative(
    name: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::NegativeAmount { name, value });
    }
    Ok(())
}

pub(crate) fn check_positive(
    name: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveAmount { name, value });
    }
    Ok(())
}

/// Builds a schedule, naming it in the error when the table is malformed.
pub(crate) fn build_schedule(
    name: &str,
    brackets: &[BracketSpec],
) -> Result<BracketSchedule, ConfigError> {
    BracketSchedule::new(brackets.to_vec()).map_err(|source| ConfigError::Schedule {
        name: name.to_string(),
        source,
    })
}

/// Rates for every calculator, as read from a rates file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub germany_income: GermanyIncomeConfig,
    pub germany_benefits: GermanyBenefitsConfig,
    pub vehicle_import: VehicleImportConfig,
    pub netherlands: NetherlandsIncomeConfig,
    pub portugal: PortugalNhrConfig,
    pub spain: SpainCapitalGainsConfig,
    pub united_states: SelfEmploymentConfig,
}

impl RatesConfig {
    /// Parses a rates file's contents.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RatesConfig = toml::from_str(contents)?;
        debug!("parsed rates configuration");
        Ok(config)
    }

    /// Reads and parses a rates file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "loaded rates configuration");
        Ok(config)
    }

    /// Renders the configuration as a rates file.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
