//! Simulation result structures

use serde::{Deserialize, Serialize};

use super::solver::PrecisionWarning;
use crate::schedule::{ScheduleRow, ScheduleTotals};
use crate::subsidy::PriceBand;

/// Complete output of one simulation. Built in one piece at the end of a
/// run and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    // Loan build-up
    pub down_payment_amount: f64,
    pub subsidy_value: f64,
    pub subsidy_band: PriceBand,
    /// Price - down payment - subsidy
    pub financed_amount: f64,
    pub initial_costs_total: f64,
    /// Financed amount + initial costs; the schedule's principal
    pub loan_amount: f64,
    pub monthly_rate: f64,

    // Headline figures
    /// Annuity installment without insurance and fees
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_amortization: f64,

    // Rates and values (percentages except VAN)
    pub tcea: f64,
    pub trea: f64,
    pub van: f64,
    /// Monthly rate in percent, not annualized
    pub tir: f64,

    // Periodic cost totals
    pub insurance_life: f64,
    pub insurance_risk: f64,
    pub periodic_fees: f64,
    pub total_periodic_costs: f64,

    pub schedule: Vec<ScheduleRow>,

    /// Rate solves that did not reach tolerance
    #[serde(default)]
    pub warnings: Vec<PrecisionWarning>,
}

impl CalculationResult {
    pub fn totals(&self) -> ScheduleTotals {
        ScheduleTotals::from_rows(&self.schedule)
    }

    pub fn term_months(&self) -> usize {
        self.schedule.len()
    }

    /// Sum of everything paid over the life of the loan
    pub fn total_paid(&self) -> f64 {
        self.schedule.iter().map(|r| r.total_payment).sum()
    }
}
