//! Amortization schedule generation

mod state;
mod generator;
mod rows;
pub mod export;

pub use state::{annuity_payment, AmortizationState};
pub use generator::{GracePolicy, InsuranceConfig, ScheduleGenerator};
pub use rows::{ScheduleRow, ScheduleTotals};
pub use export::{write_schedule_csv, write_schedule_csv_file};
