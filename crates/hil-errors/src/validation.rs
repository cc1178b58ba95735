//! Errors for bad tables, rows and configuration values.
//!
//! Raised while loading configuration, expanding scenario matrices and
//! binding parameter rows to typed arguments.

use core::fmt;

use crate::common::ErrorSeverity;

/// A table, row or configuration value was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Numeric setting outside its accepted range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// Rejected value
        value: String,
        /// Lower limit
        min: String,
        /// Upper limit
        max: String,
    },

    /// Mandatory field left empty
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// A value could not be converted to the type it binds to
    #[error("Invalid format for field '{field}': {reason}")]
    InvalidFormat {
        /// Field or parameter name
        field: String,
        /// Conversion failure
        reason: String,
    },

    /// A parameter row does not match the axis it belongs to
    #[error("Axis '{axis}' expects {expected} values per row, got {actual}")]
    RowWidth {
        /// Comma separated axis names
        axis: String,
        /// Number of names on the axis
        expected: usize,
        /// Number of values in the offending row
        actual: usize,
    },

    /// The same parameter name appears on two axes
    #[error("Parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    /// `(start, stop, step)` does not describe a usable sweep
    #[error("Invalid sweep for '{attr}': {reason}")]
    InvalidSweep {
        /// Attribute being swept
        attr: String,
        /// Reason
        reason: String,
    },
}

impl ValidationError {
    /// Always [`ErrorSeverity::Error`]; a bad table cannot run.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// [`ValidationError::OutOfRange`], rendering the numbers with `Debug`.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// [`ValidationError::InvalidSweep`].
    pub fn invalid_sweep(attr: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidSweep {
            attr: attr.into(),
            reason: reason.into(),
        }
    }
}
