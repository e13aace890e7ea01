//! Plain-text rendering of reports and validation errors.

use std::fmt::Write;

use toolzer_core::{Report, ValidationErrors};

/// Renders the title followed by one `label  value` line per entry, values
/// right-aligned in a shared column.
pub fn render_report(report: &Report) -> String {
    let lines = report.render();
    let label_width = lines.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{}", report.title);
    for (label, value) in &lines {
        let _ = writeln!(out, "  {label:<label_width$}  {value:>value_width$}");
    }
    out
}

/// Renders one line per validation problem.
pub fn render_errors(errors: &ValidationErrors) -> String {
    let mut out = String::from("Invalid input:\n");
    for error in errors.errors() {
        let _ = writeln!(out, "  {}: {}", error.field, error.message);
    }
    out
}
