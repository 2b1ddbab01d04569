//! Price bands and the BBP bonus table

use serde::{Deserialize, Serialize};

use crate::inputs::HousingType;

/// Integrated bonus added for eligible applicants outside R5, in soles
pub const INTEGRATED_BONUS_PEN: f64 = 3600.0;

/// Property price bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceBand {
    R1,
    R2,
    R3,
    R4,
    R5,
}

/// Closed PEN intervals per band. Prices in the gaps between bands or
/// outside all of them have no band.
const BAND_BOUNDS_PEN: [(PriceBand, f64, f64); 5] = [
    (PriceBand::R1, 68_800.0, 98_100.0),
    (PriceBand::R2, 98_101.0, 146_900.0),
    (PriceBand::R3, 146_901.0, 244_600.0),
    (PriceBand::R4, 244_601.0, 362_100.0),
    (PriceBand::R5, 362_101.0, 488_800.0),
];

impl PriceBand {
    /// Find the band whose bounds contain `price`.
    ///
    /// `buy_rate` converts the PEN bounds into the loan currency (1.0 for a
    /// PEN loan).
    pub fn classify(price: f64, buy_rate: f64) -> Option<PriceBand> {
        BAND_BOUNDS_PEN
            .iter()
            .find(|(_, min, max)| price >= min / buy_rate && price <= max / buy_rate)
            .map(|(band, _, _)| *band)
    }

    /// Base bonus in soles for this band and housing type
    pub fn base_bonus_pen(&self, housing: HousingType) -> f64 {
        match housing {
            HousingType::Traditional => match self {
                PriceBand::R1 => 27_400.0,
                PriceBand::R2 => 22_800.0,
                PriceBand::R3 => 20_900.0,
                PriceBand::R4 => 7_800.0,
                PriceBand::R5 => 0.0,
            },
            HousingType::Sustainable => match self {
                PriceBand::R1 => 33_700.0,
                PriceBand::R2 => 29_100.0,
                PriceBand::R3 => 27_200.0,
                PriceBand::R4 => 14_100.0,
                PriceBand::R5 => 0.0,
            },
        }
    }

    /// PEN bounds of the band
    pub fn bounds_pen(&self) -> (f64, f64) {
        BAND_BOUNDS_PEN
            .iter()
            .find(|(band, _, _)| band == self)
            .map(|(_, min, max)| (*min, *max))
            .unwrap_or((0.0, 0.0))
    }
}

/// Express a PEN amount in the loan currency
pub fn to_loan_currency(amount_pen: f64, buy_rate: f64) -> f64 {
    amount_pen / buy_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_bounds_in_pen() {
        assert_eq!(PriceBand::classify(68_800.0, 1.0), Some(PriceBand::R1));
        assert_eq!(PriceBand::classify(98_100.0, 1.0), Some(PriceBand::R1));
        assert_eq!(PriceBand::classify(98_101.0, 1.0), Some(PriceBand::R2));
        assert_eq!(PriceBand::classify(244_600.0, 1.0), Some(PriceBand::R3));
        assert_eq!(PriceBand::classify(362_101.0, 1.0), Some(PriceBand::R5));
        assert_eq!(PriceBand::classify(488_800.0, 1.0), Some(PriceBand::R5));
    }

    #[test]
    fn test_out_of_range_and_gaps() {
        assert_eq!(PriceBand::classify(50_000.0, 1.0), None);
        assert_eq!(PriceBand::classify(500_000.0, 1.0), None);
        // Between R1's max and R2's min
        assert_eq!(PriceBand::classify(98_100.5, 1.0), None);
    }

    #[test]
    fn test_usd_bounds_are_scaled() {
        // 98,100 / 3.75 = 26,160 exactly
        assert_eq!(PriceBand::classify(26_160.0, 3.75), Some(PriceBand::R1));
        assert_eq!(PriceBand::classify(26_161.0, 3.75), Some(PriceBand::R2));
        // A PEN-sized number is far above every USD bound
        assert_eq!(PriceBand::classify(98_100.0, 3.75), None);
    }

    #[test]
    fn test_bonus_table() {
        assert_eq!(PriceBand::R1.base_bonus_pen(HousingType::Traditional), 27_400.0);
        assert_eq!(PriceBand::R4.base_bonus_pen(HousingType::Traditional), 7_800.0);
        assert_eq!(PriceBand::R2.base_bonus_pen(HousingType::Sustainable), 29_100.0);
        assert_eq!(PriceBand::R5.base_bonus_pen(HousingType::Sustainable), 0.0);
        assert_eq!(PriceBand::R3.bounds_pen(), (146_901.0, 244_600.0));
    }
}
