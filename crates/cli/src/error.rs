//! Error types for hilctl

use sdr_hil_errors::{DeviceError, HilError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Connection failed: {0}")]
    Connection(#[from] DeviceError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{failed} scenario(s) failed, {errors} errored")]
    ScenariosFailed { failed: usize, errors: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hil(#[from] HilError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::ScenariosFailed { .. } => 1,
            CliError::InvalidConfiguration(_) => 2,
            CliError::Connection(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Io(_) => 5,
            CliError::Hil(e) => match e {
                HilError::Config(_) => 2,
                HilError::Device(_) => 3,
                HilError::Validation(_) => 4,
                HilError::Io(_) => 5,
                _ => 1,
            },
        }
    }
}
