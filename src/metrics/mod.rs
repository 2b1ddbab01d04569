//! Financial metrics and the end-to-end simulation
//!
//! - Bisection rate solver shared by TCEA and TIR
//! - TCEA / TREA / VAN / TIR over a generated schedule
//! - `MetricsAggregator`, which runs inputs through subsidy, rate
//!   conversion and schedule generation into a `CalculationResult`

mod solver;
mod aggregator;
mod results;

pub use solver::{present_value, solve_rate, PrecisionWarning, SolveOutcome, SolverConfig};
pub use aggregator::{
    calculate_tcea, calculate_tir, calculate_trea, calculate_van, headline_installment,
    MetricsAggregator, SimulationConfig, TirCashflows,
};
pub use results::CalculationResult;
