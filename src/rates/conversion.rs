//! Conversion of quoted interest rates to an effective monthly rate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// How the lender quotes the loan's interest rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateType {
    /// Effective annual rate
    Tea,
    /// Effective semi-annual rate
    Tes,
    /// Effective quarterly rate
    Tet,
    /// Effective monthly rate
    Tem,
    /// Nominal annual rate, needs a capitalization period
    Tna,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Tea => "TEA",
            RateType::Tes => "TES",
            RateType::Tet => "TET",
            RateType::Tem => "TEM",
            RateType::Tna => "TNA",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEA" => Ok(RateType::Tea),
            "TES" => Ok(RateType::Tes),
            "TET" => Ok(RateType::Tet),
            "TEM" => Ok(RateType::Tem),
            "TNA" => Ok(RateType::Tna),
            _ => Err(SimulationError::UnsupportedRateType(s.to_string())),
        }
    }
}

/// Capitalization frequency of a nominal annual rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalizationPeriod {
    #[serde(alias = "anual")]
    Annual,
    #[serde(alias = "semanal")]
    Weekly,
    #[serde(alias = "trimestral")]
    Quarterly,
    #[serde(alias = "mensual")]
    Monthly,
}

impl CapitalizationPeriod {
    /// Number of capitalizations in a year
    pub fn per_year(&self) -> u32 {
        match self {
            CapitalizationPeriod::Annual => 1,
            CapitalizationPeriod::Quarterly => 4,
            CapitalizationPeriod::Monthly => 12,
            CapitalizationPeriod::Weekly => 52,
        }
    }
}

impl FromStr for CapitalizationPeriod {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "anual" => Ok(CapitalizationPeriod::Annual),
            "weekly" | "semanal" => Ok(CapitalizationPeriod::Weekly),
            "quarterly" | "trimestral" => Ok(CapitalizationPeriod::Quarterly),
            "monthly" | "mensual" => Ok(CapitalizationPeriod::Monthly),
            other => Err(SimulationError::invalid(
                "capitalization_period",
                format!("unknown capitalization period '{}'", other),
            )),
        }
    }
}

/// Stateless converter from quoted rates to effective monthly rates
#[derive(Debug, Clone, Copy, Default)]
pub struct RateConverter;

impl RateConverter {
    /// Convert `rate` (a percentage, e.g. 9.5 for 9.5%) to an effective monthly
    /// rate as a decimal.
    ///
    /// Effective rates are re-expressed over one month by compounding:
    /// `(1 + r)^(months_per_month / months_per_period) - 1`. A nominal annual
    /// rate is first split into its capitalization periods and the periodic
    /// rate is then compounded over a month.
    ///
    /// # Errors
    /// `MissingParameter` when `rate_type` is TNA and no capitalization period
    /// is given.
    pub fn to_monthly_rate(
        rate: f64,
        rate_type: RateType,
        capitalization: Option<CapitalizationPeriod>,
    ) -> Result<f64> {
        let r = rate / 100.0;

        let monthly = match rate_type {
            RateType::Tea => (1.0 + r).powf(1.0 / 12.0) - 1.0,
            RateType::Tes => (1.0 + r).powf(1.0 / 6.0) - 1.0,
            RateType::Tet => (1.0 + r).powf(1.0 / 3.0) - 1.0,
            RateType::Tem => r,
            RateType::Tna => {
                let period = capitalization.ok_or(SimulationError::MissingParameter(
                    "capitalization period is required for a TNA rate",
                ))?;
                let m = period.per_year() as f64;
                (1.0 + r / m).powf(m / 12.0) - 1.0
            }
        };

        Ok(monthly)
    }

    /// Same as [`to_monthly_rate`](Self::to_monthly_rate) with the rate type given as text
    pub fn to_monthly_rate_str(
        rate: f64,
        rate_type: &str,
        capitalization: Option<CapitalizationPeriod>,
    ) -> Result<f64> {
        Self::to_monthly_rate(rate, rate_type.parse()?, capitalization)
    }

    /// Effective monthly rate back to an effective annual rate (decimal)
    pub fn monthly_to_annual(monthly_rate: f64) -> f64 {
        (1.0 + monthly_rate).powi(12) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tea_compounds_back_to_annual() {
        let monthly = RateConverter::to_monthly_rate(9.5, RateType::Tea, None).unwrap();
        assert_abs_diff_eq!((1.0 + monthly).powi(12), 1.095, epsilon = 1e-12);
        assert_abs_diff_eq!(RateConverter::monthly_to_annual(monthly), 0.095, epsilon = 1e-12);
    }

    #[test]
    fn test_semiannual_and_quarterly() {
        let from_tes = RateConverter::to_monthly_rate(6.0, RateType::Tes, None).unwrap();
        assert_abs_diff_eq!((1.0 + from_tes).powi(6), 1.06, epsilon = 1e-12);

        let from_tet = RateConverter::to_monthly_rate(3.0, RateType::Tet, None).unwrap();
        assert_abs_diff_eq!((1.0 + from_tet).powi(3), 1.03, epsilon = 1e-12);
    }

    #[test]
    fn test_tem_is_identity() {
        let monthly = RateConverter::to_monthly_rate(1.25, RateType::Tem, None).unwrap();
        assert_abs_diff_eq!(monthly, 0.0125, epsilon = 1e-15);
    }

    #[test]
    fn test_tna_monthly_capitalization() {
        // 12% nominal capitalized monthly is exactly 1% per month
        let monthly =
            RateConverter::to_monthly_rate(12.0, RateType::Tna, Some(CapitalizationPeriod::Monthly))
                .unwrap();
        assert_abs_diff_eq!(monthly, 0.01, epsilon = 1e-12);

        // Annual capitalization behaves like a TEA of the same value
        let annual =
            RateConverter::to_monthly_rate(12.0, RateType::Tna, Some(CapitalizationPeriod::Annual))
                .unwrap();
        let tea = RateConverter::to_monthly_rate(12.0, RateType::Tea, None).unwrap();
        assert_abs_diff_eq!(annual, tea, epsilon = 1e-15);

        // Weekly: 52 capitalizations spread over 12 months
        let weekly =
            RateConverter::to_monthly_rate(10.4, RateType::Tna, Some(CapitalizationPeriod::Weekly))
                .unwrap();
        assert_abs_diff_eq!(weekly, 1.002_f64.powf(52.0 / 12.0) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tna_requires_capitalization() {
        let err = RateConverter::to_monthly_rate(12.0, RateType::Tna, None).unwrap_err();
        assert!(matches!(err, SimulationError::MissingParameter(_)));
    }

    #[test]
    fn test_unknown_rate_type_text() {
        let err = RateConverter::to_monthly_rate_str(10.0, "TEX", None).unwrap_err();
        assert!(matches!(err, SimulationError::UnsupportedRateType(ref s) if s == "TEX"));

        let ok = RateConverter::to_monthly_rate_str(10.0, "tea", None).unwrap();
        assert!(ok > 0.0);
    }

    #[test]
    fn test_zero_rate() {
        for rate_type in [RateType::Tea, RateType::Tes, RateType::Tet, RateType::Tem] {
            let monthly = RateConverter::to_monthly_rate(0.0, rate_type, None).unwrap();
            assert_eq!(monthly, 0.0);
        }
    }

    #[test]
    fn test_spanish_capitalization_alias() {
        let period: CapitalizationPeriod = serde_json::from_str("\"trimestral\"").unwrap();
        assert_eq!(period, CapitalizationPeriod::Quarterly);
        assert_eq!("mensual".parse::<CapitalizationPeriod>().unwrap(), CapitalizationPeriod::Monthly);
    }
}
