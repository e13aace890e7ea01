//! Calculation logic shared by every jurisdiction.
//!
//! [`schedule`] evaluates progressive bracket tables, [`pipeline`] runs a
//! calculator's named steps in order, and [`jurisdictions`] holds the
//! country-specific calculators built on both.

pub mod common;
pub mod jurisdictions;
pub mod pipeline;
pub mod schedule;

pub use pipeline::{Calculator, Pipeline, Step};
pub use schedule::{BracketSchedule, ScheduleError};
