use serde::Serialize;
use splice_core::{ErrorInfo, SpliceError};

pub mod fuzz;
pub mod signup;
pub mod synth;

/// Renders `value` as pretty-printed JSON.
pub(crate) fn render<T: Serialize>(value: &T) -> Result<String, SpliceError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| SpliceError::Serde(ErrorInfo::new("json-encode", err.to_string())))
}

/// Prints `value` as one JSON document on stdout.
pub(crate) fn emit<T: Serialize>(value: &T) -> Result<(), SpliceError> {
    println!("{}", render(value)?);
    Ok(())
}
