//! Shared test utilities for the SDR HIL suite.
//!
//! - [`mod@must`]: unwrap helpers with `#[track_caller]`
//! - [`bench`]: a scripted [`SignalBench`](sdr_hil_harness::SignalBench)
//! - [`fixtures`]: fixtures that record calls instead of measuring
//! - [`lab`]: simulated FMComms5 and DAQ2 behind one connector
//! - [`prelude`]: convenience re-exports
//!
//! ```toml
//! [dev-dependencies]
//! sdr-hil-test-helpers = { workspace = true }
//! ```

#![allow(clippy::panic, reason = "must helpers panic on failure")]

pub mod bench;
pub mod fixtures;
pub mod lab;
pub mod must;
pub mod prelude;

pub use must::*;
