//! Float comparisons for grid coordinates and values.

/// Tolerance for values that went through a text round trip
pub const TOLERANCE: f64 = 1e-9;

/// A loaded grid value equals `expected` within [`TOLERANCE`]
pub fn assert_value_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "value {actual} differs from {expected}"
    );
}

/// Distinct axis values match `expected` in length and order
pub fn assert_axis_eq(actual: &[f64], expected: &[f64]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "axis has {} values, expected {}: {actual:?}",
        actual.len(),
        expected.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= TOLERANCE, "axis value {i} is {a}, expected {e}");
    }
}
