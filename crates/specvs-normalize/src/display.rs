//! Display formatters: how raw values read to a person, independent of the
//! value used to decide the winner.

use crate::ip::IpRating;
use crate::path::{as_f64, resolve, resolve_sibling, string_list};
use serde_json::Value;
use specvs_types::SpecMap;
use std::fmt;

pub type DisplayFn = fn(&SpecMap, &str) -> Option<String>;

/// A named display formatter resolved from the registry.
#[derive(Clone, Copy)]
pub struct DisplayFormatter {
    name: &'static str,
    f: DisplayFn,
}

impl DisplayFormatter {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn render(&self, specs: &SpecMap, key: &str) -> Option<String> {
        (self.f)(specs, key).filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for DisplayFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DisplayFormatter").field(&self.name).finish()
    }
}

const FORMATTERS: &[(&str, DisplayFn)] = &[
    ("list", list),
    ("suspension", suspension),
    ("ip_rating", ip_rating),
    ("brakes", brakes),
    ("footprint", footprint),
    ("yes_no", yes_no),
    ("tires", tires),
];

pub fn lookup(name: &str) -> Option<DisplayFormatter> {
    FORMATTERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(name, f)| DisplayFormatter { name, f })
}

pub fn names() -> impl Iterator<Item = &'static str> {
    FORMATTERS.iter().map(|(n, _)| *n)
}

/// Compact number: at most two decimals, no trailing zeros.
pub fn format_number(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    let mut s = format!("{rounded:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".to_string() } else { s }
}

/// Plain rendering of a scalar raw value.
pub fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(_) => as_f64(v).map(format_number),
        Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        _ => None,
    }
}

fn list(specs: &SpecMap, key: &str) -> Option<String> {
    let items = string_list(resolve(specs, key)?);
    if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    }
}

fn suspension(specs: &SpecMap, key: &str) -> Option<String> {
    let items: Vec<String> = string_list(resolve(specs, key)?)
        .into_iter()
        .filter(|d| !d.eq_ignore_ascii_case("none"))
        .collect();
    if items.is_empty() {
        Some("none".to_string())
    } else {
        Some(items.join(", "))
    }
}

fn ip_rating(specs: &SpecMap, key: &str) -> Option<String> {
    let text = resolve(specs, key)?.as_str()?;
    IpRating::parse(text).map(IpRating::code)
}

fn brakes(specs: &SpecMap, key: &str) -> Option<String> {
    let front = resolve_sibling(specs, key, "front").and_then(scalar);
    let rear = resolve_sibling(specs, key, "rear").and_then(scalar);
    match (front, rear) {
        (Some(f), Some(r)) if f.eq_ignore_ascii_case(&r) => Some(format!("dual {}", f.to_lowercase())),
        (Some(f), Some(r)) => Some(format!("{} front, {} rear", f.to_lowercase(), r.to_lowercase())),
        (Some(f), None) => Some(format!("{} front", f.to_lowercase())),
        (None, Some(r)) => Some(format!("{} rear", r.to_lowercase())),
        (None, None) => None,
    }
}

fn footprint(specs: &SpecMap, key: &str) -> Option<String> {
    let length = resolve_sibling(specs, key, "folded_length").and_then(as_f64)?;
    let width = resolve_sibling(specs, key, "folded_width").and_then(as_f64)?;
    Some(format!("{} x {}", format_number(length), format_number(width)))
}

fn yes_no(specs: &SpecMap, key: &str) -> Option<String> {
    let yes = crate::path::as_flag(resolve(specs, key)?);
    Some(if yes { "yes" } else { "no" }.to_string())
}

fn tires(specs: &SpecMap, key: &str) -> Option<String> {
    let tire = resolve(specs, key).and_then(scalar);
    let pneumatic = resolve_sibling(specs, key, "pneumatic_type").and_then(scalar);
    match (tire, pneumatic) {
        (Some(t), Some(p)) => Some(format!("{} ({})", t.to_lowercase(), p.to_lowercase())),
        (Some(t), None) => Some(t.to_lowercase()),
        (None, Some(p)) => Some(p.to_lowercase()),
        (None, None) => None,
    }
}
