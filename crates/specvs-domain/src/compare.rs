//! The comparison primitive shared by pairwise prose and table winners.

use crate::registry::{AttributeDefinition, ComparisonMode};
use specvs_normalize::{default_category, default_number, format_number, resolve};
use specvs_types::{DiffFormat, Direction, EngineSettings, Normalized, SkipReason, SpecMap};

/// Outcome of comparing one attribute between two products.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// `diff` is the absolute numeric gap; `None` for ranked and presence wins.
    Winner { index: usize, diff: Option<f64> },
    NoWinner(SkipReason),
}

impl Verdict {
    pub fn winner(&self) -> Option<usize> {
        match self {
            Verdict::Winner { index, .. } => Some(*index),
            Verdict::NoWinner(_) => None,
        }
    }
}

/// Comparable value of `def` in one spec document.
///
/// Uses the attribute's normalizer when it has one. Otherwise the raw value
/// is read as a category for ranked attributes and as a number for the rest.
pub fn normalize(def: &AttributeDefinition, specs: &SpecMap) -> Option<Normalized> {
    if let Some(normalizer) = &def.normalizer {
        return normalizer.apply(specs, &def.key);
    }
    let raw = resolve(specs, &def.key)?;
    match def.mode {
        ComparisonMode::Ranking(_) => default_category(raw),
        ComparisonMode::Numeric(_) => default_number(raw),
        ComparisonMode::Unranked => None,
    }
}

/// Orderable score of a normalized value: the number itself in numeric mode,
/// the rank index in ranking mode. `None` when the value cannot be placed.
pub fn score(def: &AttributeDefinition, value: &Normalized) -> Option<f64> {
    match &def.mode {
        ComparisonMode::Numeric(_) => value.as_number().filter(|n| n.is_finite()),
        ComparisonMode::Ranking(ranking) => rank_index(ranking, value).map(|i| i as f64),
        ComparisonMode::Unranked => None,
    }
}

fn rank_index(ranking: &[String], value: &Normalized) -> Option<usize> {
    let label = match value {
        Normalized::Category(c) => c.trim().to_lowercase(),
        Normalized::Number(n) => format_number(*n),
    };
    ranking.iter().position(|r| *r == label)
}

/// True when a higher score is the better one.
pub fn higher_wins(def: &AttributeDefinition) -> bool {
    !matches!(def.mode, ComparisonMode::Numeric(Direction::Lower))
}

/// A zero under `require_valid_pair` means "unknown", e.g. an unset IP rating.
pub fn is_valid(def: &AttributeDefinition, score: f64) -> bool {
    !(def.require_valid_pair && score == 0.0)
}

/// Decide the winner of one attribute between two normalized values.
pub fn compare(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    a: Option<&Normalized>,
    b: Option<&Normalized>,
) -> Verdict {
    if matches!(def.mode, ComparisonMode::Unranked) {
        return Verdict::NoWinner(SkipReason::Incomparable);
    }

    match (a, b) {
        (None, None) => Verdict::NoWinner(SkipReason::MissingData),
        (Some(v), None) | (None, Some(v)) => {
            let index = if a.is_some() { 0 } else { 1 };
            presence(def, v, index)
        }
        (Some(a), Some(b)) => match &def.mode {
            ComparisonMode::Ranking(ranking) => compare_ranked(ranking, a, b),
            _ => compare_numeric(def, settings, a, b),
        },
    }
}

fn presence(def: &AttributeDefinition, present: &Normalized, index: usize) -> Verdict {
    if !def.presence_wins {
        return Verdict::NoWinner(SkipReason::MissingData);
    }
    match score(def, present) {
        Some(s) if is_valid(def, s) => Verdict::Winner { index, diff: None },
        Some(_) => Verdict::NoWinner(SkipReason::InvalidPair),
        None => Verdict::NoWinner(SkipReason::Incomparable),
    }
}

fn compare_ranked(ranking: &[String], a: &Normalized, b: &Normalized) -> Verdict {
    let (Some(ra), Some(rb)) = (rank_index(ranking, a), rank_index(ranking, b)) else {
        return Verdict::NoWinner(SkipReason::Incomparable);
    };
    if ra == rb {
        return Verdict::NoWinner(SkipReason::Tie);
    }
    let index = if ra > rb { 0 } else { 1 };
    Verdict::Winner { index, diff: None }
}

fn compare_numeric(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    a: &Normalized,
    b: &Normalized,
) -> Verdict {
    let (Some(a), Some(b)) = (score(def, a), score(def, b)) else {
        return Verdict::NoWinner(SkipReason::Incomparable);
    };
    if a == b {
        return Verdict::NoWinner(SkipReason::Tie);
    }
    if !is_valid(def, a) || !is_valid(def, b) {
        return Verdict::NoWinner(SkipReason::InvalidPair);
    }

    let higher = higher_wins(def);
    let diff = (a - b).abs();
    if !significant(def, settings, a, b, diff, higher) {
        return Verdict::NoWinner(SkipReason::BelowThreshold);
    }

    let a_better = if higher { a > b } else { a < b };
    Verdict::Winner {
        index: if a_better { 0 } else { 1 },
        diff: Some(diff),
    }
}

/// Whether the gap between two valid scores clears the attribute's bar.
pub(crate) fn significant(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    a: f64,
    b: f64,
    diff: f64,
    higher: bool,
) -> bool {
    if let Some(min_diff) = def.min_diff {
        return diff >= min_diff;
    }
    if def.diff_format == DiffFormat::FeatureCount {
        return diff >= settings.feature_count_min_diff as f64;
    }

    let base = if higher { a.min(b) } else { a.max(b) };
    let pct = if base > 0.0 { diff / base * 100.0 } else { 0.0 };
    let threshold = def
        .percentage_threshold
        .unwrap_or(settings.percentage_threshold);
    pct >= threshold
}
