//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use sdr_hil_test_helpers::prelude::*;
//! ```

pub use crate::bench::ScriptedBench;
pub use crate::fixtures::{FixtureCall, RecordingFixtures};
pub use crate::lab::{DAQ2_URI, FMCOMMS5_URI, SimLab};
pub use crate::must::{must, must_err, must_some, must_with};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
