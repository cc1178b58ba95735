//! Measurement check failures.
//!
//! A [`CheckError`] is the suite's assertion failure: the scenario ran to
//! completion on real hardware and a measured quantity was rejected. Messages
//! always carry the literal measured value and the bound it violated.

/// Rejected measurement.
///
/// # Examples
///
/// ```
/// use sdr_hil_errors::CheckError;
///
/// let err = CheckError::deviation("rx_lo", 2_400_000_000.0, 2_400_000_011.0, 8.0);
/// assert_eq!(
///     err.to_string(),
///     "rx_lo: wrote 2400000000, read back 2400000011 (tolerance 8)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckError {
    /// Value outside the closed interval `[low, high]`
    #[error("{quantity} = {value} outside [{low}, {high}]")]
    OutOfBounds {
        /// What was measured
        quantity: String,
        /// Measured value
        value: f64,
        /// Lower bound
        low: f64,
        /// Upper bound
        high: f64,
    },

    /// Readback differs from the written value by more than the tolerance
    #[error("{attr}: wrote {written}, read back {read} (tolerance {tol})")]
    Deviation {
        /// Attribute name
        attr: String,
        /// Written value
        written: f64,
        /// Value read back
        read: f64,
        /// Allowed absolute deviation
        tol: f64,
    },

    /// Value below a one-sided minimum
    #[error("{quantity} = {value} below minimum {min}")]
    BelowMinimum {
        /// What was measured
        quantity: String,
        /// Measured value
        value: f64,
        /// Minimum
        min: f64,
    },

    /// The collaborator returned a different number of values than bounds
    #[error("{quantity}: expected {expected} values, measured {actual}")]
    CountMismatch {
        /// What was measured
        quantity: String,
        /// Number of bounds
        expected: usize,
        /// Number of measurements
        actual: usize,
    },

    /// Free-form failure reported by an external measurement routine
    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    /// Create an out of bounds failure.
    pub fn out_of_bounds(quantity: impl Into<String>, value: f64, low: f64, high: f64) -> Self {
        CheckError::OutOfBounds {
            quantity: quantity.into(),
            value,
            low,
            high,
        }
    }

    /// Create a readback deviation failure.
    pub fn deviation(attr: impl Into<String>, written: f64, read: f64, tol: f64) -> Self {
        CheckError::Deviation {
            attr: attr.into(),
            written,
            read,
            tol,
        }
    }

    /// Create a below-minimum failure.
    pub fn below_minimum(quantity: impl Into<String>, value: f64, min: f64) -> Self {
        CheckError::BelowMinimum {
            quantity: quantity.into(),
            value,
            min,
        }
    }

    /// Create a free-form failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        CheckError::Failed(msg.into())
    }
}

/// Verify `low <= value <= high`.
///
/// NaN never satisfies the bound.
pub fn within(quantity: &str, value: f64, low: f64, high: f64) -> Result<(), CheckError> {
    if value >= low && value <= high {
        Ok(())
    } else {
        Err(CheckError::out_of_bounds(quantity, value, low, high))
    }
}

/// Verify `|read - written| <= tol`.
pub fn deviation_within(attr: &str, written: f64, read: f64, tol: f64) -> Result<(), CheckError> {
    if (read - written).abs() <= tol {
        Ok(())
    } else {
        Err(CheckError::deviation(attr, written, read, tol))
    }
}

/// Verify every element of `values` lies within its `[low[i], high[i]]` pair.
///
/// Elements are labelled `quantity[i]` in the failure message.
pub fn all_within(quantity: &str, values: &[f64], low: &[f64], high: &[f64]) -> Result<(), CheckError> {
    if values.len() != low.len() || low.len() != high.len() {
        return Err(CheckError::CountMismatch {
            quantity: quantity.to_string(),
            expected: low.len().min(high.len()),
            actual: values.len(),
        });
    }
    for (i, ((value, lo), hi)) in values.iter().zip(low).zip(high).enumerate() {
        within(&format!("{quantity}[{i}]"), *value, *lo, *hi)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_is_inclusive() {
        assert!(within("rssi", 10.0, 10.0, 50.0).is_ok());
        assert!(within("rssi", 50.0, 10.0, 50.0).is_ok());
        assert!(within("rssi", 50.25, 10.0, 50.0).is_err());
    }

    #[test]
    fn test_within_rejects_nan() {
        assert!(within("rssi", f64::NAN, 10.0, 50.0).is_err());
    }

    #[test]
    fn test_deviation_zero_tolerance() {
        assert!(deviation_within("tx_hardwaregain_chan0", -40.0, -40.0, 0.0).is_ok());
        assert!(deviation_within("tx_hardwaregain_chan0", -40.0, -39.75, 0.0).is_err());
    }

    #[test]
    fn test_all_within_names_index() {
        let low = [-20.0, -110.0, -120.0];
        let high = [-10.0, -60.0, -75.0];
        let err = all_within("harmonic", &[-15.0, -50.0, -100.0], &low, &high).err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("harmonic[1] = -50 outside [-110, -60]")
        );
    }

    #[test]
    fn test_all_within_count_mismatch() {
        let err = all_within("harmonic", &[-15.0], &[-20.0, -110.0], &[-10.0, -60.0]).err();
        assert!(matches!(err, Some(CheckError::CountMismatch { actual: 1, .. })));
    }
}
