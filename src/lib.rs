//! MiVivienda mortgage simulator - engine for Peru's government-backed
//! housing loans
//!
//! This library provides:
//! - Nominal/effective rate conversion to a monthly effective rate
//! - Government housing bonus (BBP) by price band and applicant profile
//! - French-method amortization with partial or total grace periods
//! - TCEA, TREA, VAN and TIR over the generated schedule
//! - Scenario comparison, ranking and parallel batch runs

pub mod error;
pub mod inputs;
pub mod rates;
pub mod subsidy;
pub mod schedule;
pub mod metrics;
pub mod scenario;
pub mod record;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use inputs::{ApplicantProfile, Currency, LoanInputs};
pub use rates::{DecolectaClient, ExchangeRateProvider, FixedExchangeRate, RateConverter, RateType};
pub use subsidy::{PriceBand, SubsidyCalculator};
pub use schedule::{ScheduleGenerator, ScheduleRow};
pub use metrics::{CalculationResult, MetricsAggregator, SimulationConfig};
pub use scenario::{ScenarioComparison, ScenarioRunner};
pub use record::SimulationRecord;
