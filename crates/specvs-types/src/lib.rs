//! Shared types for specvs.
//!
//! Design goal: versioned, explicit, boring.
//! Products go in, advantages and table rows come out. The registry file
//! schema lives here too so that tooling can emit JSON Schemas for it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const PAIRWISE_SCHEMA_V1: &str = "specvs.pairwise.v1";
pub const TABLE_SCHEMA_V1: &str = "specvs.table.v1";

/// Flattened spec document. Keys may be dot-paths (`motor.power_nominal`)
/// and values may themselves be nested objects.
pub type SpecMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,

    /// Product-type tag, e.g. `escooter`.
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub specs: SpecMap,
}

impl Product {
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
}

/// A comparable value derived from raw spec data. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Normalized {
    Number(f64),
    Category(String),
}

impl Normalized {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Normalized::Number(n) => Some(*n),
            Normalized::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            Normalized::Number(_) => None,
            Normalized::Category(c) => Some(c),
        }
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Lower,
    Higher,
}

/// Text-generation branch used when an attribute produces an advantage.
#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash,
)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum DiffFormat {
    More,
    Higher,
    Larger,
    Lighter,
    Longer,
    Shorter,
    Faster,
    Lower,
    #[default]
    Better,
    SaferTires,
    LargerTires,
    WaterResistance,
    HasFeature,
    FoldableBars,
    DualVsSingle,
    FeatureCount,
}

#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum CompositeFormat {
    /// Score-gated roll-up of the children the category winner also wins.
    #[default]
    Consolidated,

    /// Two lower-is-better factors (weight, folded footprint) decided directly.
    Portability,
}

/// Why an attribute did not produce an advantage.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingData,
    Incomparable,
    BelowThreshold,
    Tie,
    InvalidPair,
    Unformattable,
    CapReached,
    Handled,
    FallbackSuppressed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Advantage {
    /// Index of the winning product (0 or 1 in pairwise mode).
    pub winner_index: usize,

    pub headline: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,

    /// Attribute key, or the composite key for consolidated advantages.
    pub spec_key: String,

    pub winner_value: String,
    pub loser_value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct CompositeOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_index: Option<usize>,

    pub is_close: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidated: Option<Advantage>,

    /// Child keys consumed by the composite; never itemized again.
    #[serde(default)]
    pub children_handled: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PairwiseReport {
    pub schema: String,
    pub products: [ProductRef; 2],
    pub advantages: [Vec<Advantage>; 2],

    #[serde(default)]
    pub composites: BTreeMap<String, CompositeOutcome>,

    /// Attributes that were evaluated but dropped, with the reason.
    #[serde(default)]
    pub skipped: BTreeMap<String, SkipReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TableCell {
    pub display: String,
    pub winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TableRow {
    pub key: String,
    pub label: String,

    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub unit: String,

    pub cells: Vec<TableCell>,
    pub winners: BTreeSet<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TableReport {
    pub schema: String,
    pub products: Vec<ProductRef>,
    pub rows: Vec<TableRow>,
}

// ----------------------------
// Registry file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct RegistryFile {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default, rename = "attribute")]
    pub attributes: Vec<AttributeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub max_advantages_per_product: usize,

    /// Relative significance threshold in percent, used when `min_diff` is unset.
    pub percentage_threshold: f64,

    /// Minimum feature-count gap for `feature_count` attributes.
    pub feature_count_min_diff: usize,

    /// Unique features listed before the overflow counter kicks in.
    pub feature_list_limit: usize,

    /// Default cap on items joined into one consolidated composite phrase.
    pub composite_max_items: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_advantages_per_product: 6,
            percentage_threshold: 10.0,
            feature_count_min_diff: 2,
            feature_list_limit: 4,
            composite_max_items: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AttributeEntry {
    pub key: String,
    pub label: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,

    /// Numeric directionality. Mutually exclusive with `ranking`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub higher_is_better: Option<bool>,

    /// Ordered categories, worst to best. Mutually exclusive with `higher_is_better`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Vec<String>>,

    #[serde(default)]
    pub diff_format: DiffFormat,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_diff: Option<f64>,

    /// Per-attribute override of the engine's relative threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_threshold: Option<f64>,

    #[serde(default)]
    pub require_valid_pair: bool,

    /// When only one product has a value, that product wins.
    #[serde(default)]
    pub presence_wins: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_formatter: Option<String>,

    /// Key of the preferred attribute this one stands in for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_for: Option<String>,

    #[serde(default)]
    pub priority: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Headline override for label-driven formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CompositeEntry {
    pub children: Vec<String>,

    /// Spec path of the externally computed category score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_key: Option<String>,

    #[serde(default)]
    pub score_diff_threshold: f64,

    #[serde(default)]
    pub format: CompositeFormat,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}
