//! Government housing bonus (BBP) engine
//!
//! - Price band classification (R1..R5) against fixed PEN bounds
//! - Base bonus table by band and housing type
//! - Integrated bonus for eligible applicants
//! - Bounded personalization multiplier from the applicant profile

mod bands;
mod calculator;

pub use bands::{to_loan_currency, PriceBand, INTEGRATED_BONUS_PEN};
pub use calculator::{
    check_eligibility, personalization_factor, Eligibility, SubsidyBreakdown, SubsidyCalculator,
    INCOME_CEILING_PEN, MAX_ADJUSTMENT_FACTOR, PRIORITY_REGIONS,
};
