mod bracket;
mod filing_status;
mod report;
mod validation;

pub use bracket::{BracketSpec, BracketTax};
pub use filing_status::{FilingStatus, PerFilingStatus};
pub use report::{Report, ReportLine, ReportValue};
pub(crate) use validation::check_amount;
pub use validation::{MAX_AMOUNT, ValidationError, ValidationErrors};
