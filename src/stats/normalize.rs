//! Numeric normalization for dynamically-typed counters.
//!
//! Counters in monitoring documents arrive as whatever integer or float
//! width the server chose. Everything is widened to `f64`; a value that
//! cannot be read as a number is logged and counted as zero so the rest of
//! the document still decodes.

use super::value::DocValue;

/// Convert a dynamic value to `f64`. Never fails.
pub fn to_f64(value: &DocValue) -> f64 {
    match value {
        DocValue::Null => 0.0,
        DocValue::Float64(v) => *v,
        DocValue::Float32(v) => f64::from(*v),
        DocValue::Int64(v) => *v as f64,
        DocValue::Int32(v) => f64::from(*v),
        DocValue::UInt64(v) => *v as f64,
        DocValue::UInt32(v) => f64::from(*v),
        other => match convert_fallback(other) {
            Some(v) => {
                tracing::debug!(kind = other.type_name(), "converted non-native numeric value");
                v
            }
            None => {
                tracing::warn!(
                    kind = other.type_name(),
                    value = ?other,
                    "value is not convertible to float, using 0"
                );
                0.0
            }
        },
    }
}

/// Conversion for value kinds outside the native numeric set.
///
/// Only decimals written as a plain finite numeric literal convert.
pub fn convert_fallback(value: &DocValue) -> Option<f64> {
    match value {
        DocValue::Decimal(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
