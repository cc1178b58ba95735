//! IIO device and transport error types.
//!
//! These cover everything between the suite and a live board: connecting to
//! a context, locating devices and channels, and reading or writing
//! attributes.

use crate::common::ErrorSeverity;

/// Device and transport errors.
///
/// # Examples
///
/// ```
/// use sdr_hil_errors::{DeviceError, ErrorSeverity};
///
/// let err = DeviceError::attribute_io("ad7291/in_voltage0/raw", -5);
/// assert!(err.is_attribute_io());
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
///
/// let err = DeviceError::not_found("ad9361-phy-B");
/// assert!(err.is_device_unavailable());
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    /// Device not present in the context
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Channel not present on the device
    #[error("Channel {channel} ({direction}) not found on device {device}")]
    ChannelNotFound {
        /// Device name
        device: String,
        /// Channel id or name
        channel: String,
        /// "input" or "output"
        direction: &'static str,
    },

    /// Attribute not exposed by the device or channel
    #[error("Attribute '{attr}' not found on {target}")]
    AttributeNotFound {
        /// Device or channel path
        target: String,
        /// Attribute name
        attr: String,
    },

    /// Context connection failed
    #[error("Failed to connect to {uri}: {reason}")]
    ConnectionFailed {
        /// Context URI
        uri: String,
        /// Failure reason
        reason: String,
    },

    /// The URI scheme has no backend in this build
    #[error("Unsupported context URI: {0}")]
    UnsupportedUri(String),

    /// The remote side reported an errno for an attribute access
    #[error("Attribute I/O failed on {target}: errno {errno}")]
    AttributeIo {
        /// Attribute path
        target: String,
        /// Negative errno as reported by iiod
        errno: i32,
    },

    /// Malformed reply from the daemon
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Transport timeout
    #[error("Timeout after {timeout_ms}ms talking to {target}")]
    Timeout {
        /// Device or URI
        target: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Connection dropped
    #[error("Context disconnected: {0}")]
    Disconnected(String),

    /// The facade does not expose this named property
    #[error("Board {board} has no property '{property}'")]
    UnknownProperty {
        /// Facade class
        board: String,
        /// Property name
        property: String,
    },

    /// Attribute value could not be interpreted
    #[error("Invalid value '{value}' read from {target}")]
    InvalidValue {
        /// Attribute path
        target: String,
        /// Raw value
        value: String,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::NotFound(_) => ErrorSeverity::Error,
            DeviceError::ChannelNotFound { .. } => ErrorSeverity::Error,
            DeviceError::AttributeNotFound { .. } => ErrorSeverity::Error,
            DeviceError::ConnectionFailed { .. } => ErrorSeverity::Critical,
            DeviceError::UnsupportedUri(_) => ErrorSeverity::Critical,
            DeviceError::AttributeIo { .. } => ErrorSeverity::Warning,
            DeviceError::Protocol(_) => ErrorSeverity::Error,
            DeviceError::Timeout { .. } => ErrorSeverity::Warning,
            DeviceError::Disconnected(_) => ErrorSeverity::Critical,
            DeviceError::UnknownProperty { .. } => ErrorSeverity::Error,
            DeviceError::InvalidValue { .. } => ErrorSeverity::Error,
        }
    }

    /// Check if this error indicates the device is unavailable.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::NotFound(_)
                | DeviceError::ConnectionFailed { .. }
                | DeviceError::Disconnected(_)
        )
    }

    /// True for low-level read/write failures on a single attribute.
    ///
    /// Sensor polling tolerates these and moves on to the next attribute.
    pub fn is_attribute_io(&self) -> bool {
        matches!(
            self,
            DeviceError::AttributeIo { .. } | DeviceError::Timeout { .. }
        )
    }

    /// Create a not found error.
    pub fn not_found(device: impl Into<String>) -> Self {
        DeviceError::NotFound(device.into())
    }

    /// Create a channel not found error.
    pub fn channel_not_found(device: impl Into<String>, channel: impl Into<String>, output: bool) -> Self {
        DeviceError::ChannelNotFound {
            device: device.into(),
            channel: channel.into(),
            direction: if output { "output" } else { "input" },
        }
    }

    /// Create an attribute not found error.
    pub fn attribute_not_found(target: impl Into<String>, attr: impl Into<String>) -> Self {
        DeviceError::AttributeNotFound {
            target: target.into(),
            attr: attr.into(),
        }
    }

    /// Create a connection failure.
    pub fn connection_failed(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::ConnectionFailed {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create an attribute I/O error from a (negative) errno.
    pub fn attribute_io(target: impl Into<String>, errno: i32) -> Self {
        DeviceError::AttributeIo {
            target: target.into(),
            errno,
        }
    }

    /// Create a timeout error.
    pub fn timeout(target: impl Into<String>, timeout_ms: u64) -> Self {
        DeviceError::Timeout {
            target: target.into(),
            timeout_ms,
        }
    }

    /// Create an unknown property error.
    pub fn unknown_property(board: impl Into<String>, property: impl Into<String>) -> Self {
        DeviceError::UnknownProperty {
            board: board.into(),
            property: property.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(target: impl Into<String>, value: impl Into<String>) -> Self {
        DeviceError::InvalidValue {
            target: target.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_severity() {
        assert_eq!(
            DeviceError::connection_failed("ip:192.168.2.1", "refused").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            DeviceError::timeout("ad9361-phy", 1000).severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_attribute_io_classification() {
        assert!(DeviceError::attribute_io("ad7291/in_temp0/raw", -110).is_attribute_io());
        assert!(DeviceError::timeout("ad7291", 500).is_attribute_io());
        assert!(!DeviceError::not_found("ad7291").is_attribute_io());
        assert!(
            !DeviceError::attribute_not_found("ad7291/in_temp0", "raw").is_attribute_io()
        );
    }

    #[test]
    fn test_channel_not_found_direction() {
        let err = DeviceError::channel_not_found("cf-ad9361-A", "voltage7", false);
        assert_eq!(
            err.to_string(),
            "Channel voltage7 (input) not found on device cf-ad9361-A"
        );
    }

    #[test]
    fn test_device_error_is_std_error() {
        let err = DeviceError::not_found("test");
        let _: &dyn std::error::Error = &err;
    }
}
