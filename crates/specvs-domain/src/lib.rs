//! Comparison engine for specvs.
//!
//! This crate is intentionally I/O-free: it turns two (or more) spec
//! documents and a registry into advantages and table winners. Nothing here
//! fails at comparison time; missing or odd data only yields fewer results.

pub mod compare;
pub mod composite;
pub mod format;
pub mod pairwise;
pub mod registry;
pub mod table;

pub use compare::{Verdict, compare, normalize, score};
pub use composite::CompositeStep;
pub use format::{Side, format_advantage};
pub use pairwise::{compare_pair, evaluate};
pub use registry::{
    AttributeDefinition, ComparisonMode, CompositeDefinition, ConfigurationGap, GapKind, Registry,
};
pub use table::{build_row, build_table, winners};

use specvs_types::PairwiseReport;

/// Positive and negative notes for one product of a pairwise report.
///
/// Weaknesses are not computed separately: they are the opponent's
/// advantages, seen from the other side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

pub fn notes_for(report: &PairwiseReport, index: usize) -> Notes {
    if index > 1 {
        return Notes::default();
    }
    let headlines = |i: usize| -> Vec<String> {
        report.advantages[i]
            .iter()
            .map(|a| a.headline.clone())
            .collect()
    };
    Notes {
        positive: headlines(index),
        negative: headlines(1 - index),
    }
}
