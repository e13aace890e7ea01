use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use toolzer_core::calculations::jurisdictions::schedule_code;
use toolzer_core::calculations::{BracketSchedule, ScheduleError};
use toolzer_core::{BracketSpec, FilingStatus, RatesConfig};
use tracing::{debug, info};

/// Errors that can occur when loading bracket schedules.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown schedule: {0}")]
    InvalidSchedule(String),

    #[error("Schedule '{schedule}' is malformed: {source}")]
    InvalidTable {
        schedule: String,
        #[source]
        source: ScheduleError,
    },
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// Where a schedule code lands in [`RatesConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    GermanyIncome,
    Netherlands,
    Portugal,
    PortugalSolidarity,
    UnitedStates(FilingStatus),
}

/// Maps a schedule code to the configuration tables it replaces.
///
/// - `DE` → German income tax tariff
/// - `NL` → Dutch Box 1
/// - `PT` / `PT-SOLIDARITY` → Portuguese standard and solidarity schedules
/// - `US-X` → Single, `US-Y-1` → MFJ and QSS, `US-Y-2` → MFS, `US-Z` → HOH
fn schedule_targets(schedule: &str) -> Result<Vec<Target>, ScheduleLoaderError> {
    let targets = match schedule {
        "DE" => vec![Target::GermanyIncome],
        "NL" => vec![Target::Netherlands],
        "PT" => vec![Target::Portugal],
        "PT-SOLIDARITY" => vec![Target::PortugalSolidarity],
        code => FilingStatus::ALL
            .into_iter()
            .filter(|status| schedule_code(*status) == code)
            .map(Target::UnitedStates)
            .collect(),
    };
    if targets.is_empty() {
        return Err(ScheduleLoaderError::InvalidSchedule(schedule.to_string()));
    }
    Ok(targets)
}

/// A single row of the schedules CSV file.
///
/// - `schedule`: the schedule code (`DE`, `NL`, `PT`, `US-X`, ...)
/// - `lower_bound`: income at which the bracket starts
/// - `rate`: marginal rate as a decimal (e.g., 0.10 for 10%)
/// - `rate_end`: optional; the rate reached at the top of a linear
///   progression bracket
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub schedule: String,
    pub lower_bound: Decimal,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub rate_end: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// One validated schedule read from the CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTable {
    pub code: String,
    pub schedule: BracketSchedule,
}

/// Loader for bracket schedules from CSV files.
///
/// Rows are grouped by schedule code in file order, each group is checked as
/// a [`BracketSchedule`], and the result replaces the matching tables of a
/// [`RatesConfig`].
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed schedule records");
        Ok(records)
    }

    /// Groups records by schedule code and validates each group.
    ///
    /// Tables keep the order in which their code first appears. Rows of one
    /// code must be listed in ascending `lower_bound` order.
    pub fn tables(records: &[ScheduleRecord]) -> Result<Vec<ScheduleTable>, ScheduleLoaderError> {
        let mut groups: Vec<(String, Vec<BracketSpec>)> = Vec::new();

        for record in records {
            let spec = BracketSpec {
                lower_bound: record.lower_bound,
                rate: record.rate,
                rate_end: record.rate_end,
            };
            match groups.iter_mut().find(|(code, _)| *code == record.schedule) {
                Some((_, specs)) => specs.push(spec),
                None => groups.push((record.schedule.clone(), vec![spec])),
            }
        }

        groups
            .into_iter()
            .map(|(code, specs)| {
                schedule_targets(&code)?;
                let schedule =
                    BracketSchedule::new(specs).map_err(|source| ScheduleLoaderError::InvalidTable {
                        schedule: code.clone(),
                        source,
                    })?;
                Ok(ScheduleTable { code, schedule })
            })
            .collect()
    }

    /// Replaces the configuration tables named by `tables`.
    ///
    /// Returns the number of configuration tables written. `US-Y-1` fills
    /// both the MFJ and QSS tables, so it counts twice.
    pub fn apply(
        config: &mut RatesConfig,
        tables: &[ScheduleTable],
    ) -> Result<usize, ScheduleLoaderError> {
        let mut written = 0;

        for table in tables {
            let brackets = table.schedule.brackets().to_vec();
            for target in schedule_targets(&table.code)? {
                let slot = match target {
                    Target::GermanyIncome => &mut config.germany_income.brackets,
                    Target::Netherlands => &mut config.netherlands.brackets,
                    Target::Portugal => &mut config.portugal.brackets,
                    Target::PortugalSolidarity => &mut config.portugal.solidarity_brackets,
                    Target::UnitedStates(status) => {
                        config.united_states.income_brackets.get_mut(status)
                    }
                };
                *slot = brackets.clone();
                written += 1;
            }
            info!(
                schedule = %table.code,
                brackets = brackets.len(),
                "replaced schedule"
            );
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"schedule,lower_bound,rate,rate_end
DE,0,0,
DE,12096,0.14,0.24
DE,17443,0.24,0.42
DE,68429,0.42,
DE,277825,0.45,
US-Y-1,0,0.10,
US-Y-1,23850,0.12,
US-Y-1,96950,0.22,
US-Y-1,206700,0.24,
US-Y-1,394600,0.32,
US-Y-1,501050,0.35,
US-Y-1,751600,0.37,
"#;

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "schedule,lower_bound,rate,rate_end\nNL,0,0.3582,";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![ScheduleRecord {
                schedule: "NL".to_string(),
                lower_bound: dec!(0),
                rate: dec!(0.3582),
                rate_end: None,
            }]
        );
    }

    #[test]
    fn test_parse_csv_linear_bracket() {
        let csv = "schedule,lower_bound,rate,rate_end\nDE,12096,0.14,0.24";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].rate_end, Some(dec!(0.24)));
    }

    #[test]
    fn test_parse_csv_without_rate_end_column() {
        let csv = "schedule,lower_bound,rate\nNL,0,0.3582";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].rate_end, None);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "schedule,lower_bound\nNL,0";

        let err = ScheduleLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let ScheduleLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "schedule,lower_bound,rate,rate_end\nNL,abc,0.3582,";

        let err = ScheduleLoader::parse(csv.as_bytes()).expect_err("Should fail for bad decimal");

        assert!(matches!(err, ScheduleLoaderError::CsvParse(_)));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "schedule,lower_bound,rate,rate_end\n";

        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_tables_group_in_file_order() {
        let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let tables = ScheduleLoader::tables(&records).expect("Failed to build tables");

        let codes: Vec<_> = tables.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["DE", "US-Y-1"]);
        assert_eq!(tables[0].schedule.brackets().len(), 5);
        assert_eq!(tables[1].schedule.brackets().len(), 7);
    }

    #[test]
    fn test_tables_reject_unordered_rows() {
        let csv = "schedule,lower_bound,rate,rate_end\nNL,0,0.30,\nNL,50000,0.40,\nNL,40000,0.50,";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let err = ScheduleLoader::tables(&records).expect_err("Should reject unordered rows");

        match err {
            ScheduleLoaderError::InvalidTable { ref schedule, .. } => assert_eq!(schedule, "NL"),
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn test_tables_reject_unknown_code() {
        let csv = "schedule,lower_bound,rate,rate_end\nFR,0,0.30,";
        let records = ScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let err = ScheduleLoader::tables(&records).expect_err("Should reject unknown code");

        match err {
            ScheduleLoaderError::InvalidSchedule(ref schedule) => assert_eq!(schedule, "FR"),
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_y1_fills_mfj_and_qss() {
        let mut config = RatesConfig::default();
        config.united_states.income_brackets.qualifying_surviving_spouse.clear();
        let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let tables = ScheduleLoader::tables(&records).expect("Failed to build tables");

        let written = ScheduleLoader::apply(&mut config, &tables).expect("Failed to apply");

        assert_eq!(written, 3);
        let brackets = &config.united_states.income_brackets;
        assert_eq!(brackets.qualifying_surviving_spouse.len(), 7);
        assert_eq!(
            brackets.qualifying_surviving_spouse,
            brackets.married_filing_jointly
        );
    }

    #[test]
    fn test_schedule_targets() {
        assert_eq!(
            schedule_targets("US-X").expect("Should map US-X"),
            vec![Target::UnitedStates(FilingStatus::Single)]
        );
        assert_eq!(
            schedule_targets("US-Y-1").expect("Should map US-Y-1"),
            vec![
                Target::UnitedStates(FilingStatus::MarriedFilingJointly),
                Target::UnitedStates(FilingStatus::QualifyingSurvivingSpouse),
            ]
        );
        assert_eq!(
            schedule_targets("US-Y-2").expect("Should map US-Y-2"),
            vec![Target::UnitedStates(FilingStatus::MarriedFilingSeparately)]
        );
        assert_eq!(
            schedule_targets("US-Z").expect("Should map US-Z"),
            vec![Target::UnitedStates(FilingStatus::HeadOfHousehold)]
        );
        assert_eq!(
            schedule_targets("PT-SOLIDARITY").expect("Should map PT-SOLIDARITY"),
            vec![Target::PortugalSolidarity]
        );
    }
}
