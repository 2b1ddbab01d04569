//! Loan terms and applicant profile supplied by the simulation form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::rates::{CapitalizationPeriod, RateType};
use crate::schedule::{GracePolicy, InsuranceConfig};

/// Default Cok (annual discount rate, %) used for VAN
fn default_discount_rate() -> f64 {
    5.0
}

fn default_frequency() -> u32 {
    12
}

/// Longest accepted loan term (100 years)
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Currency the loan is denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "PEN")]
    Pen,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Pen => "S/",
            Currency::Usd => "$",
        }
    }
}

/// Whether `down_payment` is an amount or a percentage of the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownPaymentType {
    Amount,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    Years,
    Months,
}

/// Grace-period regime applied to the first months of the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GracePeriodType {
    /// Amortization starts in month 1
    #[default]
    None,
    /// Interest is paid, principal is not
    Partial,
    /// Nothing but periodic costs is paid; interest is capitalized
    Total,
}

/// Housing type declared for the BBP bonus table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HousingType {
    #[default]
    #[serde(alias = "Tradicional")]
    Traditional,
    #[serde(alias = "Sostenible")]
    Sustainable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[serde(alias = "urbana")]
    Urban,
    Rural,
}

/// Self-declared income tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeTier {
    #[serde(alias = "bajo")]
    Low,
    #[serde(alias = "medio")]
    Medium,
    #[serde(alias = "alto")]
    High,
}

/// One-off costs financed together with the loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialCosts {
    pub notary: f64,
    pub registration: f64,
    pub appraisal: f64,
    pub study_commission: f64,
    pub activation_commission: f64,
}

impl InitialCosts {
    pub fn total(&self) -> f64 {
        self.notary
            + self.registration
            + self.appraisal
            + self.study_commission
            + self.activation_commission
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("initial_costs.notary", self.notary),
            ("initial_costs.registration", self.registration),
            ("initial_costs.appraisal", self.appraisal),
            ("initial_costs.study_commission", self.study_commission),
            ("initial_costs.activation_commission", self.activation_commission),
        ]
    }
}

/// Insurance rates and fixed fees charged every period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicCharges {
    /// Life (desgravamen) insurance rate, % applied per period
    pub life_insurance_rate: f64,
    /// Property (risk) insurance rate, % per year
    pub property_insurance_rate: f64,
    pub mailing_fee: f64,
    pub admin_fee: f64,
    pub periodic_commission: f64,
    /// Payment frequency used to scale the property insurance: 12, 24 or 52
    #[serde(default = "default_frequency")]
    pub frequency_per_year: u32,
}

impl Default for PeriodicCharges {
    fn default() -> Self {
        Self {
            life_insurance_rate: 0.0,
            property_insurance_rate: 0.0,
            mailing_fee: 0.0,
            admin_fee: 0.0,
            periodic_commission: 0.0,
            frequency_per_year: default_frequency(),
        }
    }
}

/// Applicant data feeding BBP eligibility and personalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantProfile {
    pub age: Option<u32>,
    /// Gross monthly household income in soles
    pub monthly_income: Option<f64>,
    /// Department (region) of the property
    pub region: Option<String>,
    pub zone: Option<Zone>,
    pub household_size: u32,
    pub minors: u32,
    pub income_tier: Option<IncomeTier>,

    // Special conditions
    pub senior: bool,
    pub displaced: bool,
    pub returnee: bool,
    pub disabled: bool,

    pub housing_type: HousingType,
}

impl ApplicantProfile {
    /// Number of declared special conditions
    pub fn special_condition_count(&self) -> usize {
        [self.senior, self.displaced, self.returnee, self.disabled]
            .iter()
            .filter(|&&flag| flag)
            .count()
    }

    pub fn has_special_condition(&self) -> bool {
        self.special_condition_count() > 0
    }

    /// Age 60+ or the senior flag
    pub fn is_elderly(&self) -> bool {
        self.senior || self.age.is_some_and(|age| age >= 60)
    }
}

/// Everything needed to run one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub property_price: f64,
    pub down_payment: f64,
    pub down_payment_type: DownPaymentType,
    pub currency: Currency,

    pub rate_type: RateType,
    /// Quoted rate in percent
    pub rate: f64,
    /// Required when `rate_type` is TNA
    #[serde(default)]
    pub capitalization_period: Option<CapitalizationPeriod>,

    pub term_value: u32,
    pub term_unit: TermUnit,

    #[serde(default)]
    pub grace_period_type: GracePeriodType,
    #[serde(default)]
    pub grace_period_months: u32,

    #[serde(default)]
    pub initial_costs: InitialCosts,
    #[serde(default)]
    pub periodic_charges: PeriodicCharges,

    /// Cok for VAN, annual effective %
    #[serde(default = "default_discount_rate")]
    pub discount_rate_annual: f64,

    #[serde(default)]
    pub applicant: ApplicantProfile,

    /// Used only to stamp due dates on the schedule
    #[serde(default)]
    pub disbursement_date: Option<NaiveDate>,
}

impl LoanInputs {
    /// Minimal inputs: no down payment, no grace, no costs, default applicant
    pub fn new(
        property_price: f64,
        currency: Currency,
        rate_type: RateType,
        rate: f64,
        term_value: u32,
        term_unit: TermUnit,
    ) -> Self {
        Self {
            property_price,
            down_payment: 0.0,
            down_payment_type: DownPaymentType::Amount,
            currency,
            rate_type,
            rate,
            capitalization_period: None,
            term_value,
            term_unit,
            grace_period_type: GracePeriodType::None,
            grace_period_months: 0,
            initial_costs: InitialCosts::default(),
            periodic_charges: PeriodicCharges::default(),
            discount_rate_annual: default_discount_rate(),
            applicant: ApplicantProfile::default(),
            disbursement_date: None,
        }
    }

    /// Term in months; saturates instead of overflowing, `validate` rejects
    /// anything above [`MAX_TERM_MONTHS`]
    pub fn term_months(&self) -> u32 {
        match self.term_unit {
            TermUnit::Years => self.term_value.saturating_mul(12),
            TermUnit::Months => self.term_value,
        }
    }

    pub fn down_payment_amount(&self) -> f64 {
        match self.down_payment_type {
            DownPaymentType::Percentage => self.property_price * self.down_payment / 100.0,
            DownPaymentType::Amount => self.down_payment,
        }
    }

    pub fn grace_policy(&self) -> GracePolicy {
        GracePolicy::new(self.grace_period_type, self.grace_period_months)
    }

    pub fn insurance_config(&self) -> InsuranceConfig {
        let charges = &self.periodic_charges;
        InsuranceConfig {
            life_rate_pct: charges.life_insurance_rate,
            property_rate_pct: charges.property_insurance_rate,
            property_value: self.property_price,
            mailing_fee: charges.mailing_fee,
            admin_fee: charges.admin_fee,
            periodic_commission: charges.periodic_commission,
            frequency_per_year: charges.frequency_per_year,
        }
    }

    /// Check the preconditions the schedule generator relies on.
    ///
    /// A missing TNA capitalization period is not checked here; the rate
    /// converter reports it as `MissingParameter`.
    pub fn validate(&self) -> Result<()> {
        if !(self.property_price.is_finite() && self.property_price > 0.0) {
            return Err(SimulationError::invalid("property_price", "must be greater than 0"));
        }

        match self.down_payment_type {
            DownPaymentType::Percentage if !(0.0..=100.0).contains(&self.down_payment) => {
                return Err(SimulationError::invalid(
                    "down_payment",
                    format!("percentage {} is outside [0, 100]", self.down_payment),
                ));
            }
            DownPaymentType::Amount if !(0.0..=self.property_price).contains(&self.down_payment) => {
                return Err(SimulationError::invalid(
                    "down_payment",
                    format!(
                        "amount {} is outside [0, {}]",
                        self.down_payment, self.property_price
                    ),
                ));
            }
            _ => {}
        }

        if !(self.rate.is_finite() && self.rate >= 0.0) {
            return Err(SimulationError::invalid("rate", "must be 0 or greater"));
        }

        let term = self.term_months();
        if term == 0 {
            return Err(SimulationError::invalid("term_value", "must be greater than 0"));
        }
        if term > MAX_TERM_MONTHS {
            return Err(SimulationError::invalid(
                "term_value",
                format!("term exceeds {} months", MAX_TERM_MONTHS),
            ));
        }

        match (self.grace_period_type, self.grace_period_months) {
            (GracePeriodType::None, 0) => {}
            (GracePeriodType::None, months) => {
                return Err(SimulationError::invalid(
                    "grace_period_months",
                    format!("{} months given without a grace period type", months),
                ));
            }
            (_, 0) => {
                return Err(SimulationError::invalid(
                    "grace_period_months",
                    "a partial or total grace period needs at least one month",
                ));
            }
            (_, months) if months > term => {
                return Err(SimulationError::invalid(
                    "grace_period_months",
                    format!("{} grace months exceed the {}-month term", months, term),
                ));
            }
            _ => {}
        }

        for (field, value) in self.initial_costs.fields() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimulationError::invalid(field, "must be 0 or greater"));
            }
        }

        let charges = &self.periodic_charges;
        let periodic = [
            ("periodic_charges.life_insurance_rate", charges.life_insurance_rate),
            ("periodic_charges.property_insurance_rate", charges.property_insurance_rate),
            ("periodic_charges.mailing_fee", charges.mailing_fee),
            ("periodic_charges.admin_fee", charges.admin_fee),
            ("periodic_charges.periodic_commission", charges.periodic_commission),
        ];
        for (field, value) in periodic {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimulationError::invalid(field, "must be 0 or greater"));
            }
        }

        if ![12, 24, 52].contains(&charges.frequency_per_year) {
            return Err(SimulationError::invalid(
                "periodic_charges.frequency_per_year",
                format!("{} is not one of 12, 24 or 52", charges.frequency_per_year),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoanInputs {
        let mut inputs =
            LoanInputs::new(150_000.0, Currency::Pen, RateType::Tea, 9.5, 20, TermUnit::Years);
        inputs.down_payment = 20.0;
        inputs.down_payment_type = DownPaymentType::Percentage;
        inputs
    }

    #[test]
    fn test_term_and_down_payment() {
        let inputs = sample();
        assert_eq!(inputs.term_months(), 240);
        assert_eq!(inputs.down_payment_amount(), 30_000.0);

        let mut by_amount = sample();
        by_amount.down_payment_type = DownPaymentType::Amount;
        by_amount.down_payment = 25_000.0;
        by_amount.term_unit = TermUnit::Months;
        assert_eq!(by_amount.term_months(), 20);
        assert_eq!(by_amount.down_payment_amount(), 25_000.0);
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_down_payment_bounds() {
        let mut inputs = sample();
        inputs.down_payment = 120.0;
        assert!(matches!(
            inputs.validate(),
            Err(SimulationError::InvalidInput { field: "down_payment", .. })
        ));

        inputs.down_payment_type = DownPaymentType::Amount;
        inputs.down_payment = 150_001.0;
        assert!(inputs.validate().is_err());

        inputs.down_payment = 150_000.0;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_grace_period_rules() {
        let mut inputs = sample();
        inputs.grace_period_months = 6;
        assert!(inputs.validate().is_err(), "months without a grace type");

        inputs.grace_period_type = GracePeriodType::Total;
        assert!(inputs.validate().is_ok());

        inputs.grace_period_months = 0;
        assert!(inputs.validate().is_err(), "grace type without months");

        inputs.grace_period_months = 240;
        assert!(inputs.validate().is_ok(), "grace covering the whole term");

        inputs.grace_period_months = 241;
        assert!(matches!(
            inputs.validate(),
            Err(SimulationError::InvalidInput { field: "grace_period_months", .. })
        ));
    }

    #[test]
    fn test_term_upper_bound() {
        let mut inputs = sample();
        inputs.term_value = 100;
        assert_eq!(inputs.term_months(), MAX_TERM_MONTHS);
        assert!(inputs.validate().is_ok());

        inputs.term_value = 101;
        assert!(matches!(
            inputs.validate(),
            Err(SimulationError::InvalidInput { field: "term_value", .. })
        ));

        // Large enough to overflow when multiplied by 12
        inputs.term_value = 400_000_000;
        assert_eq!(inputs.term_months(), u32::MAX);
        assert!(matches!(
            inputs.validate(),
            Err(SimulationError::InvalidInput { field: "term_value", .. })
        ));
    }

    #[test]
    fn test_frequency_must_be_supported() {
        let mut inputs = sample();
        inputs.periodic_charges.frequency_per_year = 24;
        assert!(inputs.validate().is_ok());
        inputs.periodic_charges.frequency_per_year = 6;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut inputs = sample();
        inputs.initial_costs.appraisal = -1.0;
        assert!(matches!(
            inputs.validate(),
            Err(SimulationError::InvalidInput { field: "initial_costs.appraisal", .. })
        ));
    }

    #[test]
    fn test_profile_flags() {
        let mut profile = ApplicantProfile::default();
        assert!(!profile.has_special_condition());
        assert!(!profile.is_elderly());

        profile.displaced = true;
        profile.disabled = true;
        assert_eq!(profile.special_condition_count(), 2);

        profile.age = Some(60);
        assert!(profile.is_elderly());
    }

    #[test]
    fn test_initial_costs_total() {
        let costs = InitialCosts {
            notary: 100.0,
            registration: 50.0,
            appraisal: 300.0,
            study_commission: 25.0,
            activation_commission: 25.0,
        };
        assert_eq!(costs.total(), 500.0);
    }
}
