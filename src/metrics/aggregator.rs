//! Full simulation: loan build-up, schedule and financial metrics

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::results::CalculationResult;
use super::solver::{solve_rate, PrecisionWarning, SolveOutcome, SolverConfig};
use crate::error::Result;
use crate::inputs::{Currency, LoanInputs};
use crate::rates::{validate_quote, ExchangeRateProvider, RateConverter, RateType};
use crate::schedule::{ScheduleGenerator, ScheduleRow, ScheduleTotals};
use crate::subsidy::SubsidyCalculator;

/// Which payment stream the TIR is solved over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TirCashflows {
    /// Full payment including mailing, admin and commission fees.
    ///
    /// The MiVivienda web simulator solves its TIR over the fee-free
    /// stream instead; use `WithoutFees` to reproduce its figures.
    #[default]
    WithFees,
    /// Same stream as the TCEA (fees removed)
    WithoutFees,
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub solver: SolverConfig,

    /// Periods whose VAN outflow includes life insurance
    pub life_insurance_cash_periods: usize,

    /// TREA as a fixed share of the TCEA
    pub trea_ratio: f64,

    pub tir_cashflows: TirCashflows,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            life_insurance_cash_periods: 4,
            trea_ratio: 0.9,
            tir_cashflows: TirCashflows::WithFees,
        }
    }
}

/// Runs simulations with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    config: SimulationConfig,
}

impl MetricsAggregator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run one simulation, fetching an exchange quote when the loan is in USD.
    ///
    /// Fails without a partial result if the quote is unavailable.
    pub async fn compute<P: ExchangeRateProvider>(
        &self,
        inputs: &LoanInputs,
        provider: &P,
    ) -> Result<CalculationResult> {
        inputs.validate()?;

        let buy_rate = match inputs.currency {
            Currency::Pen => 1.0,
            Currency::Usd => provider.buy_rate().await?,
        };

        self.compute_with_rate(inputs, buy_rate)
    }

    /// Run one simulation with an already resolved buy rate (ignored for PEN)
    pub fn compute_with_rate(&self, inputs: &LoanInputs, buy_rate: f64) -> Result<CalculationResult> {
        inputs.validate()?;
        if inputs.currency == Currency::Usd {
            validate_quote(buy_rate)?;
        }

        let down_payment_amount = inputs.down_payment_amount();
        let financed_before_subsidy = inputs.property_price - down_payment_amount;

        let subsidy = SubsidyCalculator::new(inputs.currency, buy_rate)
            .breakdown(inputs.property_price, &inputs.applicant);
        let financed_amount = financed_before_subsidy - subsidy.total;

        let initial_costs_total = inputs.initial_costs.total();
        let loan_amount = financed_amount + initial_costs_total;

        let monthly_rate = RateConverter::to_monthly_rate(
            inputs.rate,
            inputs.rate_type,
            inputs.capitalization_period,
        )?;
        let term_months = inputs.term_months();

        info!(
            "Simulating {:.2} {} over {} months at {} {}% (monthly {:.6})",
            loan_amount,
            inputs.currency.symbol(),
            term_months,
            inputs.rate_type,
            inputs.rate,
            monthly_rate
        );

        let schedule = ScheduleGenerator::new(inputs.grace_policy(), inputs.insurance_config())
            .with_start_date(inputs.disbursement_date)
            .generate(loan_amount, monthly_rate, term_months);

        let totals = ScheduleTotals::from_rows(&schedule);
        let mut warnings = Vec::new();

        let monthly_payment = headline_installment(&schedule);

        // Regulatory rates use the financed amount, net of the initial costs
        let (tcea, tcea_outcome) = calculate_tcea(&schedule, financed_amount, &self.config.solver);
        note_precision("TCEA", &tcea_outcome, &mut warnings);
        let trea = calculate_trea(tcea, self.config.trea_ratio);

        let discount_monthly =
            RateConverter::to_monthly_rate(inputs.discount_rate_annual, RateType::Tea, None)?;
        let van = calculate_van(
            &schedule,
            discount_monthly,
            loan_amount,
            self.config.life_insurance_cash_periods,
        );

        let (tir, tir_outcome) = calculate_tir(
            &schedule,
            financed_amount,
            self.config.tir_cashflows,
            &self.config.solver,
        );
        note_precision("TIR", &tir_outcome, &mut warnings);

        debug!(
            "Metrics: payment={:.2} tcea={:.4}% trea={:.4}% van={:.2} tir={:.4}%",
            monthly_payment, tcea, trea, van, tir
        );

        Ok(CalculationResult {
            down_payment_amount,
            subsidy_value: subsidy.total,
            subsidy_band: subsidy.band,
            financed_amount,
            initial_costs_total,
            loan_amount,
            monthly_rate,
            monthly_payment,
            total_interest: totals.interest,
            total_amortization: totals.principal,
            tcea,
            trea,
            van,
            tir,
            insurance_life: totals.life_insurance,
            insurance_risk: totals.property_insurance,
            periodic_fees: totals.fixed_fees,
            total_periodic_costs: totals.periodic_costs,
            schedule,
            warnings,
        })
    }
}

fn note_precision(metric: &str, outcome: &SolveOutcome, warnings: &mut Vec<PrecisionWarning>) {
    if !outcome.converged {
        warn!(
            "{} solve did not converge after {} iterations (residual {:.3e}), using {:.8}",
            metric, outcome.iterations, outcome.residual, outcome.rate
        );
        warnings.push(PrecisionWarning::new(metric, outcome));
    }
}

/// Installment of the first amortizing period, without periodic costs
pub fn headline_installment(schedule: &[ScheduleRow]) -> f64 {
    schedule
        .iter()
        .find(|row| row.principal_paid > 0.0)
        .map(|row| row.total_payment - row.total_periodic_cost)
        .unwrap_or(0.0)
}

/// Payments without mailing, admin and commission fees
fn payments_without_fees(schedule: &[ScheduleRow]) -> Vec<f64> {
    schedule.iter().map(|r| r.total_payment - r.fixed_fees).collect()
}

/// TCEA in percent: annualized rate equating the fee-free payments with
/// `present_value`
pub fn calculate_tcea(
    schedule: &[ScheduleRow],
    present_value: f64,
    solver: &SolverConfig,
) -> (f64, SolveOutcome) {
    let outcome = solve_rate(&payments_without_fees(schedule), present_value, solver);
    let annual = RateConverter::monthly_to_annual(outcome.rate);
    (annual * 100.0, outcome)
}

/// TREA in percent, a fixed share of the TCEA
pub fn calculate_trea(tcea: f64, ratio: f64) -> f64 {
    tcea * ratio
}

/// Net present value of the loan from the borrower's side.
///
/// `CF0 = +loan_amount`; periods up to `life_insurance_periods` pay the full
/// payment, later periods exclude life insurance.
pub fn calculate_van(
    schedule: &[ScheduleRow],
    discount_rate_monthly: f64,
    loan_amount: f64,
    life_insurance_periods: usize,
) -> f64 {
    schedule.iter().enumerate().fold(loan_amount, |van, (index, row)| {
        let outflow = if index < life_insurance_periods {
            row.total_payment
        } else {
            row.total_payment - row.life_insurance
        };
        let t = index as i32 + 1;
        van - outflow / (1.0 + discount_rate_monthly).powi(t)
    })
}

/// TIR as a monthly percentage (not annualized)
pub fn calculate_tir(
    schedule: &[ScheduleRow],
    present_value: f64,
    basis: TirCashflows,
    solver: &SolverConfig,
) -> (f64, SolveOutcome) {
    let cashflows = match basis {
        TirCashflows::WithFees => schedule.iter().map(|r| r.total_payment).collect(),
        TirCashflows::WithoutFees => payments_without_fees(schedule),
    };
    let outcome = solve_rate(&cashflows, present_value, solver);
    (outcome.rate * 100.0, outcome)
}
