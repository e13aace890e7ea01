//! Bracket schedule data for the calculators.
//!
//! Schedules are kept in a CSV file (`schedule,lower_bound,rate,rate_end`)
//! and merged into a [`toolzer_core::RatesConfig`].

mod loader;

pub use loader::{ScheduleLoader, ScheduleLoaderError, ScheduleRecord, ScheduleTable};
