//! Sentinel handling and on-disk unit conversions
//!
//! Source files store temperatures in tenths of a degree Celsius and
//! precipitation in hundredths of a millimeter; the literal `-9999` marks
//! a missing measurement in any field.

/// Sentinel value denoting "no measurement" in a raw data field
pub const MISSING_SENTINEL: i64 = -9999;

/// Convert a raw tenths-of-a-degree value to degrees Celsius.
///
/// Returns `None` for the missing-value sentinel.
pub fn tenths_to_degrees(raw: i64) -> Option<f64> {
    if raw == MISSING_SENTINEL {
        None
    } else {
        Some(raw as f64 / 10.0)
    }
}

/// Convert a raw hundredths-of-a-millimeter value to centimeters.
///
/// Returns `None` for the missing-value sentinel.
pub fn hundredths_to_cm(raw: i64) -> Option<f64> {
    if raw == MISSING_SENTINEL {
        None
    } else {
        Some(raw as f64 / 100.0)
    }
}
