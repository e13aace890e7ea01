use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single user-input problem found before calculating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every validation problem of one calculation attempt.
///
/// Returned instead of a result; the calculation is skipped entirely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", .0.len(), join(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Messages in the order they were found.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Returns `true` when some error concerns `field`.
    pub fn has_field(
        &self,
        field: &str,
    ) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Largest money amount a calculator accepts.
///
/// Keeps every product of an amount with a rate or a count inside the range
/// of [`Decimal`].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Pushes an error when `value` is negative or above [`MAX_AMOUNT`].
pub(crate) fn check_amount(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Decimal,
) {
    if value < Decimal::ZERO {
        errors.push(ValidationError::new(
            field,
            format!("must not be negative, got {value}"),
        ));
    } else if value > MAX_AMOUNT {
        errors.push(ValidationError::new(
            field,
            format!("must not exceed {MAX_AMOUNT}, got {value}"),
        ));
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
