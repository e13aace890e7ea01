use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use toolzer_core::FilingStatus;
use toolzer_core::calculations::jurisdictions::FederalState;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Error returned for a command-line value with no matching code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseArgError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("unknown filing status '{0}', expected one of S, MFJ, MFS, HOH, QSS")]
    FilingStatus(String),

    #[error("unknown federal state '{0}', expected a two-letter code such as BE or BY")]
    FederalState(String),
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
/// Returns an error and logs when the input is invalid (non-empty but not parseable).
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseArgError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ParseArgError::Date(s.to_string()))
}

/// Parses a filing status code (`S`, `MFJ`, `MFS`, `HOH`, `QSS`), case-insensitive.
pub fn parse_filing_status(s: &str) -> Result<FilingStatus, ParseArgError> {
    FilingStatus::parse(s).ok_or_else(|| ParseArgError::FilingStatus(s.to_string()))
}

/// Parses a two-letter German state code, case-insensitive.
pub fn parse_federal_state(s: &str) -> Result<FederalState, ParseArgError> {
    FederalState::parse(s).ok_or_else(|| ParseArgError::FederalState(s.to_string()))
}
