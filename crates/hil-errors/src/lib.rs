//! Centralized error types for the SDR hardware-in-the-loop suite
//!
//! Every crate in the workspace reports failures through [`HilError`], which
//! wraps the more specific sub-errors:
//!
//! - [`common`]: Top-level error type, classification and context helpers
//! - [`device`]: IIO transport, device, channel and attribute errors
//! - [`validation`]: Configuration and parameter-table validation errors
//! - [`check`]: Measurement assertions that fell outside their bounds
//!
//! The distinction matters to the scenario runner: a [`CheckError`] means the
//! hardware was tested and failed, anything else means the scenario could not
//! be carried out.
//!
//! # Example
//!
//! ```
//! use sdr_hil_errors::prelude::*;
//!
//! fn check_rssi(value: f64) -> HilResult<()> {
//!     if !(10.0..=50.0).contains(&value) {
//!         return Err(CheckError::out_of_bounds("rssi", value, 10.0, 50.0).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_rssi(20.0).is_ok());
//! assert!(check_rssi(80.0).is_err());
//! ```

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod check;
pub mod common;
pub mod device;
pub mod prelude;
pub mod validation;

pub use check::CheckError;
pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, HilError, ResultExt};
pub use device::DeviceError;
pub use validation::ValidationError;

/// A specialized `Result` type for suite operations.
pub type HilResult<T> = std::result::Result<T, HilError>;
