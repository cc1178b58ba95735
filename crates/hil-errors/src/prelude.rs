//! One-line import for the error types and check helpers.
//!
//! ```
//! use sdr_hil_errors::prelude::*;
//!
//! fn rssi_in_band(rssi: f64) -> HilResult<()> {
//!     within("rssi", rssi, 10.0, 50.0)?;
//!     Ok(())
//! }
//!
//! assert!(rssi_in_band(30.0).is_ok());
//! assert!(rssi_in_band(75.0).is_err_and(|e| e.is_check_failure()));
//! ```

pub use crate::{
    HilResult,
    check::{CheckError, all_within, deviation_within, within},
    common::{ErrorCategory, ErrorContext, ErrorSeverity, HilError, ResultExt},
    device::DeviceError,
    validation::ValidationError,
};

/// Build an [`ErrorContext`](crate::ErrorContext) from an operation and `key => value` pairs.
///
/// ```
/// use sdr_hil_errors::error_context;
///
/// let ctx = error_context!("apply", "attr" => "rx_lo", "value" => "2400000000");
/// assert!(ctx.to_string().contains("rx_lo"));
/// ```
#[macro_export]
macro_rules! error_context {
    ($operation:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::ErrorContext::new($operation)$(.with($key, $value))*
    };
}

/// Return `Err($error.into())` unless `$condition` holds.
#[macro_export]
macro_rules! validate {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}
