//! Load simulation inputs from JSON files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use super::LoanInputs;
use crate::error::Result;

/// Load one simulation from a JSON file
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<LoanInputs> {
    let path = path.as_ref();
    debug!("Loading simulation inputs from {}", path.display());
    let file = File::open(path)?;
    load_inputs_from_reader(BufReader::new(file))
}

/// Load one simulation from any reader (e.g., string buffer, request body)
pub fn load_inputs_from_reader<R: Read>(reader: R) -> Result<LoanInputs> {
    let inputs = serde_json::from_reader(reader)?;
    Ok(inputs)
}

/// Load several simulations, one file each, preserving order
pub fn load_many<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<LoanInputs>> {
    paths.iter().map(load_inputs).collect()
}
