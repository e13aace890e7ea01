//! Locale-aware presentation of amounts and rates.
//!
//! Money is shown in whole currency units and rates with two decimals, the
//! way the calculator pages display them. [`parse_amount`] reverses
//! [`format_currency`] so a rendered value can be read back.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolzer_core::format::{Locale, format_currency, format_percent};
//!
//! assert_eq!(format_currency(dec!(60000), Locale::German), "60.000 €");
//! assert_eq!(format_currency(dec!(8477.73), Locale::UsEnglish), "$8,478");
//! assert_eq!(format_percent(dec!(0.3582), Locale::Dutch), "35,82%");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{round_half_up, round_whole};

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$60,000`
    Prefix,
    /// `€ 60.000`
    PrefixSpaced,
    /// `60.000 €`
    SuffixSpaced,
}

/// Formatting conventions of one display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    German,
    Dutch,
    Portuguese,
    Spanish,
    UsEnglish,
}

impl Locale {
    fn symbol(self) -> &'static str {
        match self {
            Self::UsEnglish => "$",
            _ => "€",
        }
    }

    fn placement(self) -> SymbolPlacement {
        match self {
            Self::UsEnglish => SymbolPlacement::Prefix,
            Self::Dutch => SymbolPlacement::PrefixSpaced,
            Self::German | Self::Portuguese | Self::Spanish => SymbolPlacement::SuffixSpaced,
        }
    }

    fn group_separator(self) -> char {
        match self {
            Self::UsEnglish => ',',
            Self::Portuguese => ' ',
            Self::German | Self::Dutch | Self::Spanish => '.',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Self::UsEnglish => '.',
            _ => ',',
        }
    }

    /// Integer digits needed before grouping kicks in; Spanish and
    /// Portuguese leave four-digit amounts ungrouped.
    fn min_grouping_digits(self) -> usize {
        match self {
            Self::Spanish | Self::Portuguese => 5,
            _ => 4,
        }
    }

    fn percent_suffix(self) -> &'static str {
        match self {
            Self::German | Self::Spanish => " %",
            _ => "%",
        }
    }

    /// ISO 4217 code of the currency shown for this locale.
    pub fn currency_code(self) -> &'static str {
        match self {
            Self::UsEnglish => "USD",
            _ => "EUR",
        }
    }
}

/// Error returned when a formatted amount cannot be read back.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{input}'")]
pub struct ParseAmountError {
    input: String,
}

fn group_digits(
    digits: &str,
    separator: char,
    min_grouping: usize,
) -> String {
    if digits.len() < min_grouping {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Formats `amount` in whole currency units for `locale`.
pub fn format_currency(
    amount: Decimal,
    locale: Locale,
) -> String {
    let rounded = round_whole(amount);
    let negative = rounded < Decimal::ZERO;
    let digits = rounded.mantissa().unsigned_abs().to_string();
    let mut number = group_digits(
        &digits,
        locale.group_separator(),
        locale.min_grouping_digits(),
    );
    if negative {
        number.insert(0, '-');
    }

    match locale.placement() {
        SymbolPlacement::Prefix if negative => format!("-{}{}", locale.symbol(), &number[1..]),
        SymbolPlacement::Prefix => format!("{}{number}", locale.symbol()),
        SymbolPlacement::PrefixSpaced => format!("{} {number}", locale.symbol()),
        SymbolPlacement::SuffixSpaced => format!("{number} {}", locale.symbol()),
    }
}

/// Formats a rate given as a fraction (`0.3582`) as a percentage with two
/// decimals (`35,82 %`).
pub fn format_percent(
    rate: Decimal,
    locale: Locale,
) -> String {
    let percent = round_half_up(rate * Decimal::ONE_HUNDRED);
    let text = format!("{percent:.2}");
    let text = if locale.decimal_separator() == '.' {
        text
    } else {
        text.replace('.', &locale.decimal_separator().to_string())
    };
    format!("{text}{}", locale.percent_suffix())
}

/// Parses an amount rendered for `locale`, ignoring currency symbols,
/// percent signs and group separators.
pub fn parse_amount(
    input: &str,
    locale: Locale,
) -> Result<Decimal, ParseAmountError> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .filter(|c| *c != '$' && *c != '€' && *c != '%')
        .filter(|c| *c != locale.group_separator())
        .map(|c| if c == locale.decimal_separator() { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(ParseAmountError {
            input: input.to_string(),
        });
    }
    cleaned.parse().map_err(|_| ParseAmountError {
        input: input.to_string(),
    })
}
