//! Error types for the simulator

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Failures that abort a simulation run.
///
/// A run either produces a complete `CalculationResult` or one of these;
/// partial results are never returned.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// A nominal annual rate (TNA) was given without its capitalization period
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Rate type string that is not one of TEA, TES, TET, TEM or TNA
    #[error("Unsupported rate type: {0}")]
    UnsupportedRateType(String),

    /// The exchange-rate collaborator could not provide a buy quote
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    /// Loan inputs that violate a precondition of the engine
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
