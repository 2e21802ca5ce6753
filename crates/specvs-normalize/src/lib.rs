//! Spec lookup and normalization for specvs.
//!
//! This crate is I/O-free: every function is pure and total. Unrecognized
//! input yields a safe default or `None`, never a panic.
//!
//! Normalizers come in two kinds. Value normalizers see the raw value at the
//! attribute key. Document normalizers see the whole spec document and read
//! companion fields next to the key (see [`path::sibling_path`]).

pub mod brakes;
pub mod dimensions;
pub mod display;
pub mod ip;
pub mod path;
pub mod suspension;
pub mod tires;

pub use display::{DisplayFormatter, format_number};
pub use path::resolve;

use serde_json::Value;
use specvs_types::{Normalized, SpecMap};
use std::fmt;

pub type ValueFn = fn(&Value) -> Option<Normalized>;
pub type DocumentFn = fn(&SpecMap, &str) -> Option<Normalized>;

#[derive(Clone, Copy)]
enum Kind {
    Value(ValueFn),
    Document(DocumentFn),
}

/// A named normalizer resolved from the registry.
#[derive(Clone, Copy)]
pub struct Normalizer {
    name: &'static str,
    kind: Kind,
}

impl Normalizer {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True for normalizers that combine several raw fields.
    pub fn uses_full_document(&self) -> bool {
        matches!(self.kind, Kind::Document(_))
    }

    pub fn apply(&self, specs: &SpecMap, key: &str) -> Option<Normalized> {
        match self.kind {
            Kind::Value(f) => resolve(specs, key).and_then(f),
            Kind::Document(f) => f(specs, key),
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("name", &self.name)
            .field("full_document", &self.uses_full_document())
            .finish()
    }
}

const NORMALIZERS: &[(&str, Kind)] = &[
    ("tire_maintenance", Kind::Document(tires::maintenance)),
    ("tire_safety", Kind::Document(tires::safety)),
    ("suspension_score", Kind::Value(suspension::normalize)),
    ("ip_rating", Kind::Value(ip::normalize)),
    ("brake_maintenance", Kind::Document(brakes::maintenance)),
    ("folded_footprint", Kind::Document(dimensions::folded_footprint)),
    ("average_tire_size", Kind::Document(dimensions::average_tire_size)),
    ("motor_count", Kind::Value(dimensions::motor_count)),
    ("feature_count", Kind::Value(dimensions::feature_count)),
];

/// Resolve a normalizer by its registry name.
pub fn lookup(name: &str) -> Option<Normalizer> {
    NORMALIZERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(name, kind)| Normalizer { name, kind })
}

pub fn names() -> impl Iterator<Item = &'static str> {
    NORMALIZERS.iter().map(|(n, _)| *n)
}

/// Default numeric reading for attributes without a normalizer.
///
/// Numbers and numeric strings pass through, booleans read as 1/0.
pub fn default_number(value: &Value) -> Option<Normalized> {
    match value {
        Value::Bool(b) => Some(Normalized::Number(if *b { 1.0 } else { 0.0 })),
        _ => path::as_f64(value).map(Normalized::Number),
    }
}

/// Default categorical reading for ranked attributes without a normalizer.
pub fn default_category(value: &Value) -> Option<Normalized> {
    let text = match value {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
        Value::Number(_) => display::scalar(value)?,
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(Normalized::Category(text))
    }
}
