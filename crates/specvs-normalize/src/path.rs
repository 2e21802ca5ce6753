//! Value lookup inside a flattened spec document.

use serde_json::Value;
use specvs_types::SpecMap;

/// Resolve a (possibly dot-nested) attribute path.
///
/// A flattened key that matches the whole path wins. Otherwise the path is
/// walked segment by segment through nested objects. Absence, a non-object
/// intermediate node and JSON `null` all resolve to `None`.
pub fn resolve<'a>(specs: &'a SpecMap, path: &str) -> Option<&'a Value> {
    if let Some(v) = specs.get(path) {
        return present(v);
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut node = specs.get(first)?;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    present(node)
}

fn present(v: &Value) -> Option<&Value> {
    if v.is_null() { None } else { Some(v) }
}

/// Path of a field next to `key` (same parent object).
///
/// `sibling_path("wheels.tire_type", "self_healing")` is `wheels.self_healing`.
pub fn sibling_path(key: &str, name: &str) -> String {
    match key.rsplit_once('.') {
        Some((parent, _)) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

pub fn resolve_sibling<'a>(specs: &'a SpecMap, key: &str, name: &str) -> Option<&'a Value> {
    resolve(specs, &sibling_path(key, name))
}

/// Numeric reading of a raw value: JSON numbers, or strings with a leading
/// number (`"25 mph"`). Non-finite results are rejected.
pub fn as_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_number(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Lowercased, trimmed text of a string value; empty strings count as absent.
pub fn as_text(v: &Value) -> Option<String> {
    let s = v.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_lowercase())
    }
}

/// Truthiness of flag-like values (`true`, `1`, `"yes"`, `"true"`).
pub fn as_flag(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "yes" | "true" | "y" | "1"),
        _ => false,
    }
}

/// String items of an array value; a bare string is a one-item list.
pub fn string_list(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
