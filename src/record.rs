//! Shape of a stored simulation
//!
//! The library never persists anything; this is what the surrounding
//! application saves, with inputs and results passed through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inputs::LoanInputs;
use crate::metrics::CalculationResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub owner_id: String,
    pub name: String,
    pub inputs: LoanInputs,
    pub results: CalculationResult,
    /// Reference scenario for comparisons
    #[serde(default)]
    pub is_baseline: bool,
    pub created_at: DateTime<Utc>,
}

impl SimulationRecord {
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        inputs: LoanInputs,
        results: CalculationResult,
        is_baseline: bool,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            inputs,
            results,
            is_baseline,
            created_at: Utc::now(),
        }
    }
}
