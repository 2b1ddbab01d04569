//! Interest-rate conversion and exchange-rate quotes

mod conversion;
mod exchange;

pub use conversion::{CapitalizationPeriod, RateConverter, RateType};
pub(crate) use exchange::validate_quote;
pub use exchange::{DecolectaClient, ExchangeRateProvider, FixedExchangeRate, DEFAULT_DECOLECTA_URL};
