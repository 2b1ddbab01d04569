//! BBP (Bono del Buen Pagador) calculation

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::bands::{to_loan_currency, PriceBand, INTEGRATED_BONUS_PEN};
use crate::inputs::{ApplicantProfile, Currency, IncomeTier, Zone};

/// Monthly household income ceiling for eligibility, in soles
pub const INCOME_CEILING_PEN: f64 = 4746.0;

/// Income assumed when the applicant did not declare one
const UNDECLARED_INCOME_PEN: f64 = 5000.0;

/// Income at or below which a household counts as low income
const LOW_INCOME_PEN: f64 = 2500.0;

/// Upper bound of the personalization multiplier
pub const MAX_ADJUSTMENT_FACTOR: f64 = 1.15;

/// Departments with a priority adjustment
pub const PRIORITY_REGIONS: [&str; 10] = [
    "Amazonas",
    "Apurímac",
    "Ayacucho",
    "Huancavelica",
    "Huánuco",
    "Loreto",
    "Madre de Dios",
    "Pasco",
    "Puno",
    "Ucayali",
];

/// Eligibility verdict with a readable reason for the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: String,
}

/// Income at or under the ceiling, or at least one special condition.
///
/// Age 60+ counts as the senior condition.
pub fn check_eligibility(profile: &ApplicantProfile) -> Eligibility {
    let income = profile.monthly_income.unwrap_or(UNDECLARED_INCOME_PEN);

    if income <= INCOME_CEILING_PEN {
        return Eligibility {
            eligible: true,
            reason: format!("income S/{} <= S/{}", income, INCOME_CEILING_PEN),
        };
    }

    let mut conditions = Vec::new();
    if profile.is_elderly() {
        conditions.push("senior");
    }
    if profile.displaced {
        conditions.push("displaced");
    }
    if profile.returnee {
        conditions.push("returnee");
    }
    if profile.disabled {
        conditions.push("disability");
    }

    if conditions.is_empty() {
        Eligibility {
            eligible: false,
            reason: format!(
                "income S/{} > S/{} and no special condition",
                income, INCOME_CEILING_PEN
            ),
        }
    } else {
        Eligibility {
            eligible: true,
            reason: format!("special condition: {}", conditions.join(", ")),
        }
    }
}

fn is_priority_region(region: &str) -> bool {
    let region = region.trim().to_lowercase();
    PRIORITY_REGIONS.iter().any(|r| r.to_lowercase() == region)
}

/// Multiplier applied to the bonus for the applicant's circumstances.
///
/// Each matching rule adds to 1.0; the sum is capped at
/// [`MAX_ADJUSTMENT_FACTOR`].
pub fn personalization_factor(profile: &ApplicantProfile) -> f64 {
    let mut factor = 1.0;

    if profile.age.is_some_and(|age| age >= 60) {
        factor += 0.05;
    }

    let priority_region = profile.region.as_deref().is_some_and(is_priority_region);
    if profile.zone == Some(Zone::Rural) || priority_region {
        factor += 0.05;
    }

    let income = profile.monthly_income.unwrap_or(0.0);
    let low_income = profile.income_tier == Some(IncomeTier::Low)
        || (income > 0.0 && income <= LOW_INCOME_PEN);
    if profile.household_size >= 4 && (profile.minors >= 2 || low_income) {
        factor += 0.05;
    }

    if profile.special_condition_count() >= 2 {
        factor += 0.03;
    }

    f64::min(factor, MAX_ADJUSTMENT_FACTOR)
}

/// How a subsidy amount was put together, in the loan currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyBreakdown {
    pub band: PriceBand,
    /// False when the price fell outside every band and R5 was assumed
    pub band_matched: bool,
    pub eligible: bool,
    pub base_bonus: f64,
    pub integrated_bonus: f64,
    pub adjustment_factor: f64,
    pub total: f64,
}

/// BBP calculator bound to a resolved exchange quote
#[derive(Debug, Clone, Copy)]
pub struct SubsidyCalculator {
    buy_rate: f64,
}

impl SubsidyCalculator {
    /// Calculator for a loan in `currency`.
    ///
    /// `buy_rate` (soles per dollar) is only used for USD loans; PEN loans
    /// always use 1.0.
    pub fn new(currency: Currency, buy_rate: f64) -> Self {
        let buy_rate = match currency {
            Currency::Pen => 1.0,
            Currency::Usd => buy_rate,
        };
        Self { buy_rate }
    }

    pub fn buy_rate(&self) -> f64 {
        self.buy_rate
    }

    /// Subsidy amount in the loan currency; never negative
    pub fn compute_subsidy(&self, property_price: f64, profile: &ApplicantProfile) -> f64 {
        self.breakdown(property_price, profile).total
    }

    pub fn breakdown(&self, property_price: f64, profile: &ApplicantProfile) -> SubsidyBreakdown {
        // Eligibility is reported but only gates the integrated bonus
        let eligibility = check_eligibility(profile);
        info!(
            "BBP eligibility: {} ({})",
            if eligibility.eligible { "eligible" } else { "not eligible" },
            eligibility.reason
        );

        let matched = PriceBand::classify(property_price, self.buy_rate);
        let band = matched.unwrap_or_else(|| {
            warn!(
                "Property price {:.2} is outside every BBP band, using R5",
                property_price
            );
            PriceBand::R5
        });

        let base_bonus =
            to_loan_currency(band.base_bonus_pen(profile.housing_type), self.buy_rate);
        let integrated_bonus = if eligibility.eligible && band != PriceBand::R5 {
            to_loan_currency(INTEGRATED_BONUS_PEN, self.buy_rate)
        } else {
            0.0
        };

        let adjustment_factor = personalization_factor(profile);
        let total = ((base_bonus + integrated_bonus) * adjustment_factor).max(0.0);

        info!(
            "BBP {:?}: base={:.2} integrated={:.2} factor={:.2} total={:.2}",
            band, base_bonus, integrated_bonus, adjustment_factor, total
        );

        SubsidyBreakdown {
            band,
            band_matched: matched.is_some(),
            eligible: eligibility.eligible,
            base_bonus,
            integrated_bonus,
            adjustment_factor,
            total,
        }
    }
}
