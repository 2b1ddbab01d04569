//! Periodic rate solver for TCEA and TIR
//!
//! Finds the rate at which a stream of end-of-period payments discounts back
//! to a given present value.

use serde::{Deserialize, Serialize};

/// Search bracket and stopping rules for the bisection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Lowest periodic rate searched
    pub lower: f64,
    /// Highest periodic rate searched
    pub upper: f64,
    pub max_iterations: u32,
    /// Accepted absolute NPV residual, in money units
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower: 1e-5,
            upper: 0.1,
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

/// Result of a solve, converged or not
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Periodic rate (decimal)
    pub rate: f64,
    pub converged: bool,
    pub iterations: u32,
    /// NPV residual at `rate`
    pub residual: f64,
}

/// A solve that ran out of iterations; the midpoint was still used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionWarning {
    pub metric: String,
    pub rate: f64,
    pub iterations: u32,
    pub residual: f64,
}

impl PrecisionWarning {
    pub fn new(metric: &str, outcome: &SolveOutcome) -> Self {
        Self {
            metric: metric.to_string(),
            rate: outcome.rate,
            iterations: outcome.iterations,
            residual: outcome.residual,
        }
    }
}

/// Present value of `cashflows` paid at the end of periods 1..=n
pub fn present_value(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(i, &cf)| cf / (1.0 + rate).powi(i as i32 + 1))
        .sum()
}

/// Solve `present_value = Σ cf[i] / (1 + rate)^(i + 1)` for `rate` by bisection.
///
/// The residual `present_value - PV(rate)` increases with the rate, so a
/// positive residual means the rate is too high. When the iteration budget
/// runs out the midpoint of the last bracket is returned with
/// `converged = false`.
pub fn solve_rate(cashflows: &[f64], present_value_target: f64, config: &SolverConfig) -> SolveOutcome {
    let residual = |rate: f64| present_value_target - present_value(cashflows, rate);

    let mut low = config.lower;
    let mut high = config.upper;

    for iteration in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let npv = residual(mid);

        if npv.abs() < config.tolerance {
            return SolveOutcome {
                rate: mid,
                converged: true,
                iterations: iteration + 1,
                residual: npv,
            };
        }

        if npv > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    let mid = (low + high) / 2.0;
    SolveOutcome {
        rate: mid,
        converged: false,
        iterations: config.max_iterations,
        residual: residual(mid),
    }
}
