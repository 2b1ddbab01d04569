//! MiVivienda simulator CLI
//!
//! Command-line interface for running mortgage simulations
//!
//! ```bash
//! mivivienda simulate loan.json --csv schedule.csv
//! mivivienda compare base.json clone.json --exchange-rate 3.75
//! mivivienda rank a.json b.json c.json
//! mivivienda convert 12 TNA --capitalization monthly
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use mivivienda::inputs::{load_inputs, load_many};
use mivivienda::rates::CapitalizationPeriod;
use mivivienda::scenario::{Metric, ScenarioRunner};
use mivivienda::schedule::write_schedule_csv_file;
use mivivienda::{
    CalculationResult, DecolectaClient, ExchangeRateProvider, FixedExchangeRate, RateConverter,
    RateType, SimulationError, SimulationRecord,
};

/// MiVivienda mortgage simulator
#[derive(Parser)]
#[command(name = "mivivienda")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one loan from a JSON inputs file
    Simulate {
        inputs: PathBuf,

        /// Fixed PEN-per-USD buy rate instead of the live quote
        #[arg(long)]
        exchange_rate: Option<f64>,

        /// Write the full schedule to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Print a storable record for this owner (requires --name)
        #[arg(long, requires = "name")]
        owner: Option<String>,

        #[arg(long)]
        name: Option<String>,

        /// Mark the record as the baseline scenario
        #[arg(long)]
        baseline: bool,
    },

    /// Compare a candidate scenario against a base
    Compare {
        base: PathBuf,
        candidate: PathBuf,

        #[arg(long)]
        exchange_rate: Option<f64>,
    },

    /// Simulate several scenarios and report the best per metric
    Rank {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long)]
        exchange_rate: Option<f64>,
    },

    /// Convert a rate to its effective monthly equivalent
    Convert {
        /// Rate in percent
        rate: f64,

        /// TEA, TES, TET, TEM or TNA
        rate_type: RateType,

        /// Capitalization period, required for TNA
        #[arg(long)]
        capitalization: Option<CapitalizationPeriod>,
    },
}

/// Where the CLI gets its exchange quote from
enum QuoteSource {
    Fixed(FixedExchangeRate),
    Live(DecolectaClient),
    /// No override and no API key; PEN runs still work
    Unconfigured(String),
}

impl QuoteSource {
    fn resolve(exchange_rate: Option<f64>) -> Self {
        if let Some(rate) = exchange_rate {
            return QuoteSource::Fixed(FixedExchangeRate(rate));
        }
        match DecolectaClient::from_env() {
            Ok(client) => QuoteSource::Live(client),
            Err(e) => {
                warn!("Live exchange rate disabled: {}", e);
                QuoteSource::Unconfigured(e.to_string())
            }
        }
    }
}

impl ExchangeRateProvider for QuoteSource {
    async fn buy_rate(&self) -> mivivienda::Result<f64> {
        match self {
            QuoteSource::Fixed(fixed) => fixed.buy_rate().await,
            QuoteSource::Live(client) => client.buy_rate().await,
            QuoteSource::Unconfigured(reason) => Err(SimulationError::RateUnavailable(format!(
                "{} (pass --exchange-rate)",
                reason
            ))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let runner = ScenarioRunner::default();

    match cli.command {
        Commands::Simulate {
            inputs,
            exchange_rate,
            csv,
            json,
            owner,
            name,
            baseline,
        } => {
            let loan = load_inputs(&inputs)
                .with_context(|| format!("loading {}", inputs.display()))?;
            let provider = QuoteSource::resolve(exchange_rate);
            let result = runner
                .run(&loan, &provider)
                .await
                .context("simulation failed")?;

            if let Some(path) = csv {
                write_schedule_csv_file(&path, &result.schedule)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Schedule written to: {}", path.display());
            }

            if let (Some(owner), Some(name)) = (owner, name) {
                let record = SimulationRecord::new(owner, name, loan, result, baseline);
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result, loan.currency.symbol());
            }
        }

        Commands::Compare {
            base,
            candidate,
            exchange_rate,
        } => {
            let base_loan = load_inputs(&base).with_context(|| format!("loading {}", base.display()))?;
            let candidate_loan = load_inputs(&candidate)
                .with_context(|| format!("loading {}", candidate.display()))?;
            let provider = QuoteSource::resolve(exchange_rate);

            let comparison = runner
                .run_and_compare(&base_loan, &candidate_loan, &provider)
                .await
                .context("comparison failed")?;

            println!(
                "{:<18} {:>14} {:>14} {:>14} {:>9}",
                "Metric", "Base", "Candidate", "Diff", "Diff %"
            );
            println!("{}", "-".repeat(73));
            for (metric, d) in &comparison.differences {
                println!(
                    "{:<18} {:>14.4} {:>14.4} {:>14.4} {:>8.2}%",
                    metric.label(),
                    d.base,
                    d.candidate,
                    d.diff,
                    d.diff_pct
                );
            }
        }

        Commands::Rank {
            inputs,
            exchange_rate,
        } => {
            let loans = load_many(inputs.as_slice()).context("loading scenarios")?;
            let provider = QuoteSource::resolve(exchange_rate);
            let results = runner
                .run_batch(&loans, &provider)
                .await
                .context("batch simulation failed")?;

            println!("{:<18} {:>14} {}", "Metric", "Best value", "Scenario");
            println!("{}", "-".repeat(60));
            for best in ScenarioRunner::rank(&results) {
                let direction = match best.metric.lower_is_better() {
                    Some(true) => "lowest",
                    _ => "highest",
                };
                println!(
                    "{:<18} {:>14.4} {} ({})",
                    best.metric.label(),
                    best.value,
                    inputs[best.index].display(),
                    direction
                );
            }
        }

        Commands::Convert {
            rate,
            rate_type,
            capitalization,
        } => {
            let monthly = RateConverter::to_monthly_rate(rate, rate_type, capitalization)
                .context("rate conversion failed")?;
            println!("{} {}% -> TEM {:.6}%", rate_type, rate, monthly * 100.0);
        }
    }

    Ok(())
}

fn print_summary(result: &CalculationResult, symbol: &str) {
    println!("Loan");
    println!("  Down payment:      {} {:.2}", symbol, result.down_payment_amount);
    println!(
        "  Subsidy (BBP):     {} {:.2} ({:?})",
        symbol, result.subsidy_value, result.subsidy_band
    );
    println!("  Financed amount:   {} {:.2}", symbol, result.financed_amount);
    println!("  Initial costs:     {} {:.2}", symbol, result.initial_costs_total);
    println!("  Loan amount:       {} {:.2}", symbol, result.loan_amount);
    println!("  Monthly rate:      {:.6}%", result.monthly_rate * 100.0);
    println!();

    println!("Payments");
    println!("  Monthly payment:   {} {:.2}", symbol, result.monthly_payment);
    println!("  Total interest:    {} {:.2}", symbol, result.total_interest);
    println!("  Periodic costs:    {} {:.2}", symbol, result.total_periodic_costs);
    println!();

    println!("Metrics");
    for metric in [Metric::Tcea, Metric::Trea, Metric::Van, Metric::Tir] {
        println!("  {:<18} {:.4}", metric.label(), metric.value(result));
    }
    for w in &result.warnings {
        println!("  ! {} did not converge (residual {:.3e})", w.metric, w.residual);
    }
    println!();

    println!(
        "{:>6} {:>10} {:>14} {:>12} {:>12} {:>10} {:>12}",
        "Period", "DueDate", "Opening", "Interest", "Principal", "Costs", "Payment"
    );
    println!("{}", "-".repeat(82));
    for row in result.schedule.iter().take(12) {
        println!(
            "{:>6} {:>10} {:>14.2} {:>12.2} {:>12.2} {:>10.2} {:>12.2}{}",
            row.period,
            row.due_date.map(|d| d.to_string()).unwrap_or_default(),
            row.opening_balance,
            row.interest,
            row.principal_paid,
            row.total_periodic_cost,
            row.total_payment,
            if row.in_grace { " (grace)" } else { "" }
        );
    }
    if result.schedule.len() > 12 {
        println!("... ({} more periods)", result.schedule.len() - 12);
    }
}
