//! Period-by-period amortization schedule (French/annuity method)

use chrono::{Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use super::rows::ScheduleRow;
use super::state::AmortizationState;
use crate::inputs::GracePeriodType;

/// Grace regime and its length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePolicy {
    pub kind: GracePeriodType,
    pub months: u32,
}

impl GracePolicy {
    pub fn new(kind: GracePeriodType, months: u32) -> Self {
        Self { kind, months }
    }

    pub fn none() -> Self {
        Self::new(GracePeriodType::None, 0)
    }

    /// Whether `period` falls inside the grace window
    pub fn covers(&self, period: u32) -> bool {
        self.kind != GracePeriodType::None && period <= self.months
    }

    /// Periods left for amortization after the grace window
    pub fn amortizing_periods(&self, term_months: u32) -> u32 {
        match self.kind {
            GracePeriodType::None => term_months,
            _ => term_months.saturating_sub(self.months),
        }
    }
}

/// Insurance rates and fixed fees charged every period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Life insurance, % of the opening balance per period
    pub life_rate_pct: f64,
    /// Property insurance, % of the property value per year
    pub property_rate_pct: f64,
    pub property_value: f64,
    pub mailing_fee: f64,
    pub admin_fee: f64,
    pub periodic_commission: f64,
    pub frequency_per_year: u32,
}

impl InsuranceConfig {
    /// No insurance and no fees
    pub fn none(property_value: f64) -> Self {
        Self {
            life_rate_pct: 0.0,
            property_rate_pct: 0.0,
            property_value,
            mailing_fee: 0.0,
            admin_fee: 0.0,
            periodic_commission: 0.0,
            frequency_per_year: 12,
        }
    }

    /// Life insurance rate applied each period.
    ///
    /// The quoted percentage is used as-is, not divided by the frequency.
    pub fn life_rate_per_period(&self) -> f64 {
        self.life_rate_pct / 100.0
    }

    /// Property insurance rate for one period on a 360-day year
    pub fn property_rate_per_period(&self) -> f64 {
        let frequency = if self.frequency_per_year == 0 { 12 } else { self.frequency_per_year };
        let days_per_period = 360.0 / frequency as f64;
        (self.property_rate_pct / 100.0) * (days_per_period / 360.0)
    }

    /// Mailing + admin + periodic commission
    pub fn fixed_fees(&self) -> f64 {
        self.mailing_fee + self.admin_fee + self.periodic_commission
    }
}

/// Builds amortization schedules for a grace policy and cost configuration
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    grace: GracePolicy,
    insurance: InsuranceConfig,
    start_date: Option<NaiveDate>,
}

impl ScheduleGenerator {
    pub fn new(grace: GracePolicy, insurance: InsuranceConfig) -> Self {
        Self {
            grace,
            insurance,
            start_date: None,
        }
    }

    /// Stamp row `i` with `start + i months`
    pub fn with_start_date(mut self, start: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self
    }

    /// Generate `term_months` rows for `principal` at `monthly_rate`.
    ///
    /// Inputs are assumed valid (positive term, grace shorter than the term).
    pub fn generate(&self, principal: f64, monthly_rate: f64, term_months: u32) -> Vec<ScheduleRow> {
        let mut state = AmortizationState::new(principal);
        let mut rows = Vec::with_capacity(term_months as usize);
        let amortizing_periods = self.grace.amortizing_periods(term_months);

        let life_rate = self.insurance.life_rate_per_period();
        let property_rate = self.insurance.property_rate_per_period();
        let fixed_fees = self.insurance.fixed_fees();

        if self.grace.kind == GracePeriodType::None {
            state.base_payment(monthly_rate, amortizing_periods);
        }

        for _ in 0..term_months {
            state.advance_period();

            let mut row = ScheduleRow::new(state.period, state.balance);
            row.due_date = self
                .start_date
                .and_then(|d| d.checked_add_months(Months::new(state.period)));

            row.interest = state.balance * monthly_rate;
            row.life_insurance = state.balance * life_rate;
            row.property_insurance = self.insurance.property_value * property_rate;
            row.fixed_fees = fixed_fees;
            row.total_periodic_cost = row.life_insurance + row.property_insurance + row.fixed_fees;

            if self.grace.covers(state.period) {
                row.in_grace = true;
                row.principal_paid = 0.0;
                match self.grace.kind {
                    GracePeriodType::Total => {
                        row.total_payment = row.total_periodic_cost;
                        row.closing_balance = state.balance + row.interest;
                    }
                    _ => {
                        row.total_payment = row.interest + row.total_periodic_cost;
                        row.closing_balance = state.balance;
                    }
                }
            } else {
                let payment = state.base_payment(monthly_rate, amortizing_periods);
                row.principal_paid = payment - row.interest;
                row.total_payment = payment + row.total_periodic_cost;
                row.closing_balance = (state.balance - row.principal_paid).max(0.0);
            }

            state.balance = row.closing_balance;
            rows.push(row);
        }

        debug!(
            "Generated {} periods, installment {:.2}, final balance {:.6}",
            rows.len(),
            state.base_payment.unwrap_or(0.0),
            state.balance
        );

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{annuity_payment, ScheduleTotals};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn plain(grace: GracePolicy) -> ScheduleGenerator {
        ScheduleGenerator::new(grace, InsuranceConfig::none(150_000.0))
    }

    #[test]
    fn test_no_grace_repays_principal() {
        let rows = plain(GracePolicy::none()).generate(100_000.0, 0.0075, 240);
        assert_eq!(rows.len(), 240);

        let totals = ScheduleTotals::from_rows(&rows);
        assert_abs_diff_eq!(totals.principal, 100_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(rows[239].closing_balance, 0.0, epsilon = 1e-6);

        // Same installment every period
        let first = rows[0].installment();
        assert!(rows.iter().all(|r| (r.installment() - first).abs() < 1e-9));
    }

    #[test]
    fn test_balance_rolls_forward() {
        let rows = plain(GracePolicy::none()).generate(50_000.0, 0.01, 60);
        for pair in rows.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
        for row in &rows {
            assert_abs_diff_eq!(row.interest, row.opening_balance * 0.01, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_partial_grace_keeps_balance() {
        let grace = GracePolicy::new(GracePeriodType::Partial, 6);
        let rows = plain(grace).generate(100_000.0, 0.01, 120);

        for row in &rows[..6] {
            assert!(row.in_grace);
            assert_eq!(row.principal_paid, 0.0);
            assert_eq!(row.closing_balance, 100_000.0);
            assert_abs_diff_eq!(row.total_payment, 1000.0, epsilon = 1e-9);
        }

        // Installment spread over the 114 remaining periods
        let expected = annuity_payment(100_000.0, 0.01, 114);
        assert_relative_eq!(rows[6].installment(), expected, max_relative = 1e-12);
        assert_abs_diff_eq!(rows[119].closing_balance, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_total_grace_capitalizes_interest() {
        let grace = GracePolicy::new(GracePeriodType::Total, 3);
        let rows = plain(grace).generate(100_000.0, 0.01, 60);

        for row in &rows[..3] {
            assert_eq!(row.principal_paid, 0.0);
            assert_eq!(row.total_payment, 0.0);
            assert_abs_diff_eq!(row.closing_balance, row.opening_balance + row.interest, epsilon = 1e-9);
        }

        assert!(rows[3].opening_balance > 100_000.0);
        assert_relative_eq!(rows[3].opening_balance, 100_000.0 * 1.01_f64.powi(3), max_relative = 1e-12);

        // Capitalized balance is fully amortized
        let principal: f64 = rows.iter().map(|r| r.principal_paid).sum();
        assert_relative_eq!(principal, rows[3].opening_balance, max_relative = 1e-9);
        assert_abs_diff_eq!(rows[59].closing_balance, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_periodic_costs() {
        let insurance = InsuranceConfig {
            life_rate_pct: 0.045,
            property_rate_pct: 0.1,
            property_value: 150_000.0,
            mailing_fee: 3.5,
            admin_fee: 5.0,
            periodic_commission: 1.5,
            frequency_per_year: 12,
        };
        let rows = ScheduleGenerator::new(GracePolicy::none(), insurance).generate(120_000.0, 0.008, 12);

        let first = &rows[0];
        assert_abs_diff_eq!(first.life_insurance, 120_000.0 * 0.00045, epsilon = 1e-9);
        assert_abs_diff_eq!(first.property_insurance, 150_000.0 * 0.001 / 12.0, epsilon = 1e-9);
        assert_eq!(first.fixed_fees, 10.0);
        assert_abs_diff_eq!(
            first.total_periodic_cost,
            first.life_insurance + first.property_insurance + 10.0,
            epsilon = 1e-12
        );

        // Life insurance follows the declining balance, property insurance does not
        assert!(rows[11].life_insurance < first.life_insurance);
        assert_eq!(rows[11].property_insurance, first.property_insurance);
    }

    #[test]
    fn test_property_rate_scales_with_frequency() {
        let mut insurance = InsuranceConfig::none(100_000.0);
        insurance.property_rate_pct = 0.52;
        insurance.frequency_per_year = 52;
        assert_abs_diff_eq!(insurance.property_rate_per_period(), 0.0001, epsilon = 1e-15);
        insurance.frequency_per_year = 24;
        assert_abs_diff_eq!(insurance.property_rate_per_period(), 0.0052 / 24.0, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_rate_schedule() {
        let rows = plain(GracePolicy::none()).generate(12_000.0, 0.0, 12);
        assert!(rows.iter().all(|r| r.interest == 0.0 && (r.principal_paid - 1000.0).abs() < 1e-9));
        assert_abs_diff_eq!(rows[11].closing_balance, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_due_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let rows = plain(GracePolicy::none())
            .with_start_date(Some(start))
            .generate(1_000.0, 0.01, 3);
        assert_eq!(rows[0].due_date, NaiveDate::from_ymd_opt(2025, 2, 28));
        assert_eq!(rows[2].due_date, NaiveDate::from_ymd_opt(2025, 4, 30));

        let undated = plain(GracePolicy::none()).generate(1_000.0, 0.01, 3);
        assert!(undated.iter().all(|r| r.due_date.is_none()));
    }
}
