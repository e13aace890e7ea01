use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::{Locale, format_currency, format_percent};

/// Value of one report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportValue {
    Money(Decimal),
    Rate(Decimal),
    Count(u32),
    Months(u32),
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub label: String,
    pub value: ReportValue,
}

/// Presentation view of a calculation result.
///
/// Lines keep the order in which the calculator produced them. Rendering
/// only formats; it never computes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub locale: Locale,
    pub lines: Vec<ReportLine>,
}

impl Report {
    pub fn new(
        title: impl Into<String>,
        locale: Locale,
    ) -> Self {
        Self {
            title: title.into(),
            locale,
            lines: Vec::new(),
        }
    }

    fn line(
        mut self,
        label: &str,
        value: ReportValue,
    ) -> Self {
        self.lines.push(ReportLine {
            label: label.to_string(),
            value,
        });
        self
    }

    pub fn money(
        self,
        label: &str,
        amount: Decimal,
    ) -> Self {
        self.line(label, ReportValue::Money(amount))
    }

    pub fn rate(
        self,
        label: &str,
        rate: Decimal,
    ) -> Self {
        self.line(label, ReportValue::Rate(rate))
    }

    pub fn count(
        self,
        label: &str,
        count: u32,
    ) -> Self {
        self.line(label, ReportValue::Count(count))
    }

    pub fn months(
        self,
        label: &str,
        months: u32,
    ) -> Self {
        self.line(label, ReportValue::Months(months))
    }

    pub fn flag(
        self,
        label: &str,
        flag: bool,
    ) -> Self {
        self.line(label, ReportValue::Flag(flag))
    }

    pub fn text(
        self,
        label: &str,
        text: impl Into<String>,
    ) -> Self {
        self.line(label, ReportValue::Text(text.into()))
    }

    /// Looks up a line's value by label.
    pub fn value(
        &self,
        label: &str,
    ) -> Option<&ReportValue> {
        self.lines
            .iter()
            .find(|line| line.label == label)
            .map(|line| &line.value)
    }

    /// Formats every line for display as `(label, value)` pairs.
    pub fn render(&self) -> Vec<(String, String)> {
        self.lines
            .iter()
            .map(|line| {
                let value = match &line.value {
                    ReportValue::Money(amount) => format_currency(*amount, self.locale),
                    ReportValue::Rate(rate) => format_percent(*rate, self.locale),
                    ReportValue::Count(count) => count.to_string(),
                    ReportValue::Months(months) => format!("{months} months"),
                    ReportValue::Flag(true) => "yes".to_string(),
                    ReportValue::Flag(false) => "no".to_string(),
                    ReportValue::Text(text) => text.clone(),
                };
                (line.label.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn render_formats_each_kind() {
        let report = Report::new("Test", Locale::German)
            .money("Income tax", dec!(14426.54))
            .rate("Effective rate", dec!(0.2404))
            .count("Children", 2)
            .months("Duration", 14)
            .flag("New vehicle", true)
            .text("Regime", "standard");

        assert_eq!(
            report.render(),
            vec![
                ("Income tax".to_string(), "14.427 €".to_string()),
                ("Effective rate".to_string(), "24,04 %".to_string()),
                ("Children".to_string(), "2".to_string()),
                ("Duration".to_string(), "14 months".to_string()),
                ("New vehicle".to_string(), "yes".to_string()),
                ("Regime".to_string(), "standard".to_string()),
            ]
        );
    }

    #[test]
    fn value_finds_line_by_label() {
        let report = Report::new("Test", Locale::UsEnglish).money("Total", dec!(10));

        assert_eq!(report.value("Total"), Some(&ReportValue::Money(dec!(10))));
        assert_eq!(report.value("Missing"), None);
    }
}
