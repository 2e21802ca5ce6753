//! Derived size figures: folded footprint, average tire size, counts.

use crate::path::{as_f64, resolve_sibling};
use serde_json::Value;
use specvs_types::{Normalized, SpecMap};

/// `folded_length * folded_width`, `None` unless both are numeric.
pub fn folded_footprint(specs: &SpecMap, key: &str) -> Option<Normalized> {
    let length = resolve_sibling(specs, key, "folded_length").and_then(as_f64)?;
    let width = resolve_sibling(specs, key, "folded_width").and_then(as_f64)?;
    Some(Normalized::Number(length * width))
}

/// Mean of `tire_size_front` and `tire_size_rear` when both are positive,
/// otherwise whichever one is.
pub fn average_tire_size(specs: &SpecMap, key: &str) -> Option<Normalized> {
    let positive = |name: &str| {
        resolve_sibling(specs, key, name)
            .and_then(as_f64)
            .filter(|v| *v > 0.0)
    };
    let size = match (positive("tire_size_front"), positive("tire_size_rear")) {
        (Some(f), Some(r)) => (f + r) / 2.0,
        (Some(v), None) | (None, Some(v)) => v,
        (None, None) => return None,
    };
    Some(Normalized::Number(size))
}

/// Numeric passthrough; anything non-numeric counts as one motor.
pub fn motor_count(value: &Value) -> Option<Normalized> {
    Some(Normalized::Number(as_f64(value).unwrap_or(1.0)))
}

/// Number of non-empty feature names in an array.
pub fn feature_count(value: &Value) -> Option<Normalized> {
    let items = value.as_array()?;
    let n = items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .count();
    Some(Normalized::Number(n as f64))
}
