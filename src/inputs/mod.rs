//! Simulation input structures and loading

mod data;
pub mod loader;

pub use data::{
    ApplicantProfile, Currency, DownPaymentType, GracePeriodType, HousingType, IncomeTier,
    InitialCosts, LoanInputs, PeriodicCharges, TermUnit, Zone, MAX_TERM_MONTHS,
};
pub use loader::{load_inputs, load_inputs_from_reader, load_many};
