// Error types for pitwall

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Request validation errors, raised before any model runs
    #[snafu(display("Invalid input: {field} - {reason}"))]
    InvalidInput { field: String, reason: String },
    #[snafu(display("Unknown tire compound '{tag}', expected one of soft, medium, hard"))]
    UnknownCompound { tag: String },

    // Fuel model errors
    #[snafu(display("Fuel consumption rate must be a positive number of liters per lap, got {rate}"))]
    InvalidConsumptionRate { rate: f64 },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Batch request errors
    #[snafu(display("Invalid request file: {path}"))]
    InvalidRequestFile { path: String },
    #[snafu(display("Error reading request file"))]
    RequestReadError { source: io::Error },
    #[snafu(display("Error writing results file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing result"))]
    OutputSerializeError { source: serde_json::Error },
}

impl PitwallError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        PitwallError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's parameters rather than by the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PitwallError::InvalidInput { .. }
                | PitwallError::UnknownCompound { .. }
                | PitwallError::InvalidConsumptionRate { .. }
        )
    }
}
