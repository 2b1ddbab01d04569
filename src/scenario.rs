//! Scenario runner for clone-and-compare and batch simulations
//!
//! Holds one configured aggregator and runs any number of input sets
//! through it. Batches resolve the exchange quote once and compute in
//! parallel.

use std::fmt;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inputs::{Currency, LoanInputs};
use crate::metrics::{CalculationResult, MetricsAggregator, SimulationConfig};
use crate::rates::ExchangeRateProvider;

/// Headline figures that scenarios are compared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MonthlyPayment,
    TotalInterest,
    Tcea,
    Trea,
    Van,
    Tir,
    LoanAmount,
    Subsidy,
    PeriodicCosts,
}

impl Metric {
    /// Metrics reported by [`ScenarioRunner::compare`]
    pub const COMPARED: [Metric; 9] = [
        Metric::MonthlyPayment,
        Metric::TotalInterest,
        Metric::Tcea,
        Metric::Trea,
        Metric::Van,
        Metric::Tir,
        Metric::LoanAmount,
        Metric::Subsidy,
        Metric::PeriodicCosts,
    ];

    /// Metrics with a preferred direction, used by [`ScenarioRunner::rank`]
    pub const RANKED: [Metric; 8] = [
        Metric::MonthlyPayment,
        Metric::TotalInterest,
        Metric::Tcea,
        Metric::PeriodicCosts,
        Metric::Subsidy,
        Metric::Trea,
        Metric::Van,
        Metric::Tir,
    ];

    pub fn value(&self, result: &CalculationResult) -> f64 {
        match self {
            Metric::MonthlyPayment => result.monthly_payment,
            Metric::TotalInterest => result.total_interest,
            Metric::Tcea => result.tcea,
            Metric::Trea => result.trea,
            Metric::Van => result.van,
            Metric::Tir => result.tir,
            Metric::LoanAmount => result.loan_amount,
            Metric::Subsidy => result.subsidy_value,
            Metric::PeriodicCosts => result.total_periodic_costs,
        }
    }

    /// Borrower's preferred direction; `None` for loan amount
    pub fn lower_is_better(&self) -> Option<bool> {
        match self {
            Metric::MonthlyPayment | Metric::TotalInterest | Metric::Tcea | Metric::PeriodicCosts => {
                Some(true)
            }
            Metric::Subsidy | Metric::Trea | Metric::Van | Metric::Tir => Some(false),
            Metric::LoanAmount => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::MonthlyPayment => "Monthly payment",
            Metric::TotalInterest => "Total interest",
            Metric::Tcea => "TCEA %",
            Metric::Trea => "TREA %",
            Metric::Van => "VAN",
            Metric::Tir => "TIR % (monthly)",
            Metric::LoanAmount => "Loan amount",
            Metric::Subsidy => "Subsidy (BBP)",
            Metric::PeriodicCosts => "Periodic costs",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One metric of a base scenario against a candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub base: f64,
    pub candidate: f64,
    /// candidate - base
    pub diff: f64,
    /// Relative change in percent, 0 when the base is 0
    pub diff_pct: f64,
}

impl Difference {
    pub fn new(base: f64, candidate: f64) -> Self {
        let diff = candidate - base;
        let diff_pct = if base == 0.0 { 0.0 } else { diff / base * 100.0 };
        Self {
            base,
            candidate,
            diff,
            diff_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub differences: Vec<(Metric, Difference)>,
}

impl ScenarioComparison {
    pub fn get(&self, metric: Metric) -> Option<&Difference> {
        self.differences
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, d)| d)
    }
}

/// Best scenario for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestScenario {
    pub metric: Metric,
    /// Index into the ranked slice
    pub index: usize,
    pub value: f64,
}

/// Pre-configured runner for single, paired and batch simulations
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    aggregator: MetricsAggregator,
}

impl ScenarioRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            aggregator: MetricsAggregator::new(config),
        }
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }

    /// Run a single simulation
    pub async fn run<P: ExchangeRateProvider>(
        &self,
        inputs: &LoanInputs,
        provider: &P,
    ) -> Result<CalculationResult> {
        self.aggregator.compute(inputs, provider).await
    }

    /// Run every input set in parallel.
    ///
    /// The quote is requested once, and only if some scenario is in USD.
    /// The first failure fails the whole batch.
    pub async fn run_batch<P: ExchangeRateProvider>(
        &self,
        scenarios: &[LoanInputs],
        provider: &P,
    ) -> Result<Vec<CalculationResult>> {
        let buy_rate = if scenarios.iter().any(|s| s.currency == Currency::Usd) {
            provider.buy_rate().await?
        } else {
            1.0
        };

        info!("Running {} scenarios (buy rate {:.4})", scenarios.len(), buy_rate);

        scenarios
            .par_iter()
            .map(|inputs| self.aggregator.compute_with_rate(inputs, buy_rate))
            .collect()
    }

    /// Simulate a base and a candidate and compare them
    pub async fn run_and_compare<P: ExchangeRateProvider>(
        &self,
        base: &LoanInputs,
        candidate: &LoanInputs,
        provider: &P,
    ) -> Result<ScenarioComparison> {
        let results = self.run_batch(&[base.clone(), candidate.clone()], provider).await?;
        Ok(Self::compare(&results[0], &results[1]))
    }

    /// Metric-by-metric difference of `candidate` against `base`
    pub fn compare(base: &CalculationResult, candidate: &CalculationResult) -> ScenarioComparison {
        let differences = Metric::COMPARED
            .iter()
            .map(|&metric| {
                (
                    metric,
                    Difference::new(metric.value(base), metric.value(candidate)),
                )
            })
            .collect();
        ScenarioComparison { differences }
    }

    /// Best scenario per ranked metric. Ties go to the earliest scenario;
    /// an empty slice ranks nothing.
    pub fn rank(results: &[CalculationResult]) -> Vec<BestScenario> {
        if results.is_empty() {
            return Vec::new();
        }

        Metric::RANKED
            .iter()
            .filter_map(|&metric| {
                let lower = metric.lower_is_better()?;
                let mut best = BestScenario {
                    metric,
                    index: 0,
                    value: metric.value(&results[0]),
                };
                for (index, result) in results.iter().enumerate().skip(1) {
                    let value = metric.value(result);
                    let better = if lower { value < best.value } else { value > best.value };
                    if better {
                        best = BestScenario { metric, index, value };
                    }
                }
                Some(best)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::inputs::{DownPaymentType, TermUnit};
    use crate::rates::{FixedExchangeRate, RateType};
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts quote requests
    struct CountingRate {
        calls: AtomicUsize,
    }

    impl ExchangeRateProvider for CountingRate {
        async fn buy_rate(&self) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(3.75)
        }
    }

    struct UnavailableRate;

    impl ExchangeRateProvider for UnavailableRate {
        async fn buy_rate(&self) -> Result<f64> {
            Err(SimulationError::RateUnavailable("timeout".to_string()))
        }
    }

    fn base_inputs() -> LoanInputs {
        let mut inputs =
            LoanInputs::new(150_000.0, Currency::Pen, RateType::Tea, 9.5, 20, TermUnit::Years);
        inputs.down_payment = 20.0;
        inputs.down_payment_type = DownPaymentType::Percentage;
        inputs
    }

    #[test]
    fn test_difference_against_zero_base() {
        let d = Difference::new(0.0, 250.0);
        assert_eq!(d.diff, 250.0);
        assert_eq!(d.diff_pct, 0.0);

        let d = Difference::new(200.0, 150.0);
        assert_eq!(d.diff, -50.0);
        assert_abs_diff_eq!(d.diff_pct, -25.0, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_lower_rate_clone_is_cheaper() {
        let runner = ScenarioRunner::default();
        let base = base_inputs();
        let mut candidate = base.clone();
        candidate.rate = 8.0;

        let comparison = runner
            .run_and_compare(&base, &candidate, &FixedExchangeRate(3.75))
            .await
            .unwrap();

        assert_eq!(comparison.differences.len(), Metric::COMPARED.len());
        assert!(comparison.get(Metric::MonthlyPayment).unwrap().diff < 0.0);
        assert!(comparison.get(Metric::TotalInterest).unwrap().diff < 0.0);
        assert!(comparison.get(Metric::Tcea).unwrap().diff < 0.0);
        // Same price and profile, same subsidy
        assert_eq!(comparison.get(Metric::Subsidy).unwrap().diff, 0.0);
        assert_eq!(comparison.get(Metric::Subsidy).unwrap().diff_pct, 0.0);
    }

    #[tokio::test]
    async fn test_batch_fetches_quote_once_for_usd() {
        let runner = ScenarioRunner::default();
        let provider = CountingRate {
            calls: AtomicUsize::new(0),
        };

        let mut usd = base_inputs();
        usd.currency = Currency::Usd;
        usd.property_price = 40_000.0;
        let scenarios = vec![base_inputs(), usd.clone(), usd];

        let results = runner.run_batch(&scenarios, &provider).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pen_batch_skips_quote() {
        let runner = ScenarioRunner::default();
        let results = runner
            .run_batch(&[base_inputs(), base_inputs()], &UnavailableRate)
            .await
            .unwrap();
        assert_eq!(results[0], results[1]);
    }

    #[tokio::test]
    async fn test_batch_fails_as_a_whole() {
        let runner = ScenarioRunner::default();
        let mut broken = base_inputs();
        broken.term_value = 0;

        let err = runner
            .run_batch(&[base_inputs(), broken], &FixedExchangeRate(3.75))
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_rank_picks_best_per_metric() {
        let runner = ScenarioRunner::default();
        let expensive = base_inputs();
        let mut cheap = base_inputs();
        cheap.rate = 7.0;
        let same_as_cheap = cheap.clone();

        let results = runner
            .run_batch(&[expensive, cheap, same_as_cheap], &FixedExchangeRate(3.75))
            .await
            .unwrap();
        let ranking = ScenarioRunner::rank(&results);
        assert_eq!(ranking.len(), Metric::RANKED.len());

        let best = |metric: Metric| ranking.iter().find(|b| b.metric == metric).unwrap().index;
        // Tie between 1 and 2 resolves to the first
        assert_eq!(best(Metric::MonthlyPayment), 1);
        assert_eq!(best(Metric::TotalInterest), 1);
        assert_eq!(best(Metric::Tcea), 1);
        assert_eq!(best(Metric::Trea), 0);
        // Equal subsidies everywhere
        assert_eq!(best(Metric::Subsidy), 0);
    }

    #[test]
    fn test_rank_empty() {
        assert!(ScenarioRunner::rank(&[]).is_empty());
    }
}
