//! [`HilError`] and the classification the runner and CLI rely on.

use core::fmt;

use crate::{CheckError, DeviceError, ValidationError};

/// Any failure a scenario, fixture or configuration step can report.
#[derive(Debug, thiserror::Error)]
pub enum HilError {
    /// IIO transport or device lookup
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Malformed tables or configuration values
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A measurement fell outside its expected bounds
    #[error("Check failed: {0}")]
    Check(#[from] CheckError),

    /// An external library the scenario depends on is not available
    #[error("{0}")]
    MissingCollaborator(String),

    /// Local file access (configuration, reports)
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Session configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else, usually with context prepended
    #[error("{0}")]
    Other(String),
}

impl HilError {
    /// Broad class, used in logs and the CLI error type.
    pub fn category(&self) -> ErrorCategory {
        match self {
            HilError::Device(_) => ErrorCategory::Device,
            HilError::Validation(_) => ErrorCategory::Validation,
            HilError::Check(_) => ErrorCategory::Check,
            HilError::MissingCollaborator(_) => ErrorCategory::Collaborator,
            HilError::Io(_) => ErrorCategory::IO,
            HilError::Config(_) => ErrorCategory::Config,
            HilError::Other(_) => ErrorCategory::Other,
        }
    }

    /// How serious the failure is for the rest of the session.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HilError::Device(e) => e.severity(),
            HilError::Validation(e) => e.severity(),
            HilError::MissingCollaborator(_) => ErrorSeverity::Critical,
            HilError::Check(_) | HilError::Io(_) | HilError::Config(_) | HilError::Other(_) => {
                ErrorSeverity::Error
            }
        }
    }

    /// True when the hardware was exercised and a measurement was rejected.
    pub fn is_check_failure(&self) -> bool {
        matches!(self, HilError::Check(_))
    }

    /// [`HilError::Config`] from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        HilError::Config(msg.into())
    }

    /// [`HilError::MissingCollaborator`] from a message.
    pub fn missing(msg: impl Into<String>) -> Self {
        HilError::MissingCollaborator(msg.into())
    }

    /// [`HilError::Other`] from a message.
    pub fn other(msg: impl Into<String>) -> Self {
        HilError::Other(msg.into())
    }
}

impl From<std::io::Error> for HilError {
    fn from(err: std::io::Error) -> Self {
        HilError::Io(err)
    }
}

/// Broad error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// IIO transport and devices
    Device = 1,
    /// Session configuration
    Config = 3,
    /// Local files
    IO = 4,
    /// Tables and values
    Validation = 5,
    /// Measurement checks
    Check = 6,
    /// External measurement or calibration tools
    Collaborator = 7,
    /// Uncategorised
    Other = 255,
}

impl ErrorCategory {
    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCategory::Device => "Device",
            ErrorCategory::Config => "Config",
            ErrorCategory::IO => "IO",
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Check => "Check",
            ErrorCategory::Collaborator => "Collaborator",
            ErrorCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity, ordered from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Worth logging only
    Info = 0,
    /// The scenario may still be meaningful
    Warning = 1,
    /// The scenario cannot pass
    Error = 2,
    /// Critical, the session cannot carry out the scenario at all
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARN",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// What was being done when an error happened, as `op [key=value, ...]`.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Operation name
    pub operation: String,
    /// Key/value details in insertion order
    pub fields: Vec<(String, String)>,
}

impl ErrorContext {
    /// Context for `operation` with no details.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            fields: Vec::new(),
        }
    }

    /// Append a detail.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operation)?;
        if self.fields.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = self.fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, " [{}]", details.join(", "))
    }
}

/// Attach an [`ErrorContext`] to any error convertible into [`HilError`].
///
/// Check failures keep their variant so the runner still reports them as
/// failures rather than errors; every other error is flattened into
/// [`HilError::Other`] with the context prepended.
pub trait ResultExt<T> {
    /// Prefix the error with `ctx`.
    fn context(self, ctx: ErrorContext) -> Result<T, HilError>;

    /// Prefix the error with a bare operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, HilError>;
}

impl<T, E: Into<HilError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, HilError> {
        self.map_err(|e| match e.into() {
            HilError::Check(check) => HilError::Check(check),
            err => HilError::Other(format!("{ctx}: {err}")),
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, HilError> {
        self.context(ErrorContext::new(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Device.to_string(), "Device");
        assert_eq!(ErrorCategory::Check.to_string(), "Check");
        assert_eq!(ErrorCategory::Collaborator.to_string(), "Collaborator");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new("apply_param_set")
            .with("attr", "rx_lo")
            .with("board", "fmcomms5");
        let text = ctx.to_string();
        assert!(text.contains("apply_param_set"));
        assert_eq!(text, "apply_param_set [attr=rx_lo, board=fmcomms5]");
    }

    #[test]
    fn test_hil_error_category() {
        let err: HilError = DeviceError::not_found("ad9361-phy").into();
        assert_eq!(err.category(), ErrorCategory::Device);

        let err = HilError::config("bad");
        assert_eq!(err.category(), ErrorCategory::Config);

        let err = HilError::missing("libad9361-iio not installed/configured");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_with_context_keeps_check_failures() {
        let result: Result<(), CheckError> =
            Err(CheckError::out_of_bounds("rssi", 90.0, 10.0, 50.0));
        let err = result.with_context("gain_check").err();
        assert!(err.is_some_and(|e| e.is_check_failure()));
    }

    #[test]
    fn test_with_context_prefixes_other_errors() {
        let result: Result<(), DeviceError> = Err(DeviceError::not_found("ad7291"));
        let text = result
            .with_context("poll_sensors")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(text.contains("poll_sensors"));
        assert!(text.contains("ad7291"));
    }
}
