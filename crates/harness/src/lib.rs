//! Scenario harness for the SDR HIL suite.
//!
//! - [`matrix`]: parameter axes expanded into [`Case`]s
//! - [`scenario`]: test functions bound to cases, and the [`Session`] they run in
//! - [`resolver`]: hardware presence check, run before any device access
//! - [`fixtures`]: the generic test functions every board reuses
//! - [`bench`]: traits for the external measurement collaborators
//! - [`runner`] / [`report`]: sequential execution and results
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use sdr_hil_devices::{Board, sim};
//! use sdr_hil_harness::{Case, HardwareDescriptor, HilConfig, Matrix, Runner, ScenarioGroup, Session};
//! use sdr_hil_iio::mock::MockConnector;
//!
//! fn read_lo(session: &Session<'_>, _: &Case) -> sdr_hil_errors::HilResult<()> {
//!     session.open()?.get_f64("rx_lo")?;
//!     Ok(())
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HilConfig::default()
//!     .with_descriptor(HardwareDescriptor::new("fmcomms5", "mock:fmcomms5"));
//! let connector = MockConnector::new().with_context("mock:fmcomms5", sim::fmcomms5());
//! let scenarios = ScenarioGroup::new("test_lo", Board::Fmcomms5, Matrix::new(), read_lo).expand()?;
//!
//! let report = Runner::builder(config, Arc::new(connector)).build().run(&scenarios);
//! assert!(report.success());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bench;
pub mod case;
pub mod config;
pub mod fixtures;
pub mod matrix;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod scenario;
pub mod sweep;

pub use bench::{DcxoCalibrator, PhaseSync, SignalBench, TonePeak};
pub use case::Case;
pub use config::{DcxoConfig, GainConfig, HardwareDescriptor, HilConfig, SweepConfig};
pub use fixtures::{BenchFixtures, Fixtures, Target};
pub use matrix::Matrix;
pub use report::{Outcome, RunReport, ScenarioReport, Summary};
pub use resolver::{Resolution, resolve};
pub use runner::{Runner, RunnerBuilder};
pub use scenario::{Scenario, ScenarioFn, ScenarioGroup, Session, expand_all};
