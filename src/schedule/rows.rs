//! Schedule output rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One period of the amortization schedule. Rows are never modified once the
/// generator has produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    // Timing
    pub period: u32,
    pub due_date: Option<NaiveDate>,
    pub in_grace: bool,

    // Balance roll-forward
    pub opening_balance: f64,
    pub interest: f64,
    pub principal_paid: f64,
    pub closing_balance: f64,

    // Periodic costs
    pub life_insurance: f64,
    pub property_insurance: f64,
    /// Mailing + admin + periodic commission
    pub fixed_fees: f64,
    pub total_periodic_cost: f64,

    /// Everything the borrower pays this period
    pub total_payment: f64,
}

impl ScheduleRow {
    pub fn new(period: u32, opening_balance: f64) -> Self {
        Self {
            period,
            due_date: None,
            in_grace: false,
            opening_balance,
            interest: 0.0,
            principal_paid: 0.0,
            closing_balance: opening_balance,
            life_insurance: 0.0,
            property_insurance: 0.0,
            fixed_fees: 0.0,
            total_periodic_cost: 0.0,
            total_payment: 0.0,
        }
    }

    /// Installment without insurance and fees (the annuity part)
    pub fn installment(&self) -> f64 {
        self.total_payment - self.total_periodic_cost
    }
}

/// Column totals over a schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub periods: u32,
    pub interest: f64,
    pub principal: f64,
    pub life_insurance: f64,
    pub property_insurance: f64,
    pub fixed_fees: f64,
    pub periodic_costs: f64,
    pub payments: f64,
    pub final_balance: f64,
}

impl ScheduleTotals {
    pub fn from_rows(rows: &[ScheduleRow]) -> Self {
        let mut totals = rows.iter().fold(Self::default(), |mut acc, row| {
            acc.interest += row.interest;
            acc.principal += row.principal_paid;
            acc.life_insurance += row.life_insurance;
            acc.property_insurance += row.property_insurance;
            acc.fixed_fees += row.fixed_fees;
            acc.periodic_costs += row.total_periodic_cost;
            acc.payments += row.total_payment;
            acc
        });
        totals.periods = rows.len() as u32;
        totals.final_balance = rows.last().map(|r| r.closing_balance).unwrap_or(0.0);
        totals
    }
}
