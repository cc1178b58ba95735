//! Property-based tests for bound checks and error classification.

use proptest::prelude::*;
use sdr_hil_errors::prelude::*;

proptest! {
    #[test]
    fn test_within_matches_interval(value in -200.0f64..200.0, a in -200.0f64..200.0, b in -200.0f64..200.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let inside = value >= low && value <= high;
        prop_assert_eq!(within("level", value, low, high).is_ok(), inside);
    }

    #[test]
    fn test_deviation_symmetric(written in -1.0e9f64..1.0e9, delta in -16.0f64..16.0, tol in 0.0f64..16.0) {
        let read = written + delta;
        prop_assert_eq!(
            deviation_within("attr", written, read, tol).is_ok(),
            deviation_within("attr", read, written, tol).is_ok()
        );
    }

    #[test]
    fn test_check_errors_are_check_failures(value in -100.0f64..100.0) {
        let err: HilError = CheckError::out_of_bounds("q", value, 200.0, 300.0).into();
        prop_assert!(err.is_check_failure());
        prop_assert_eq!(err.category(), ErrorCategory::Check);
    }

    #[test]
    fn test_device_error_message_contains_device(device in "[a-zA-Z0-9_-]+") {
        let err = DeviceError::not_found(&device);
        prop_assert!(err.to_string().contains(&device));
    }

    #[test]
    fn test_out_of_bounds_message_carries_value(value in 1000i32..2000) {
        let err = CheckError::out_of_bounds("in_voltage0", f64::from(value), 0.0, 10.0);
        prop_assert!(err.to_string().contains(&value.to_string()));
    }
}
