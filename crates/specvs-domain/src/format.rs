//! Advantage text: headlines and comparison lines per `DiffFormat`.
//!
//! Every function here is a pure string builder. Anything that cannot be
//! phrased yields `None` and the attribute is skipped as unformattable.

use crate::registry::{AttributeDefinition, ComparisonMode};
use specvs_normalize::{format_number, path::string_list, resolve};
use specvs_types::{Advantage, DiffFormat, EngineSettings, Normalized, SpecMap};
use std::collections::BTreeSet;

/// One product's view of an attribute: its raw document and normalized value.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub specs: &'a SpecMap,
    pub value: Option<&'a Normalized>,
}

const MISSING: &str = "n/a";

/// Attach a unit; inch marks, percent and degrees sit flush against the number.
pub fn with_unit(number: &str, unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() {
        number.to_string()
    } else if unit.starts_with(['"', '%', '°']) {
        format!("{number}{unit}")
    } else {
        format!("{number} {unit}")
    }
}

/// Human rendering of one side's value.
///
/// A display formatter sees the raw document; without one the normalized
/// value is shown.
pub fn display_value(def: &AttributeDefinition, side: Side<'_>) -> Option<String> {
    if let Some(display) = &def.display {
        if let Some(text) = display.render(side.specs, &def.key) {
            return Some(text);
        }
    }
    match side.value? {
        Normalized::Number(n) => Some(with_unit(&format_number(*n), &def.unit)),
        Normalized::Category(c) => Some(c.replace('_', " ")),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn category(side: Side<'_>) -> Option<String> {
    side.value?.as_category().map(|c| c.replace('_', " "))
}

fn versus(w: &Option<String>, l: &Option<String>) -> Option<String> {
    Some(format!("{} vs {}", w.as_deref()?, l.as_deref().unwrap_or(MISSING)))
}

fn label_or_default(def: &AttributeDefinition, prefix: &str) -> String {
    def.headline
        .clone()
        .unwrap_or_else(|| format!("{prefix} {}", def.label))
}

fn motor_word(count: i64) -> String {
    match count {
        1 => "single".to_string(),
        2 => "dual".to_string(),
        3 => "triple".to_string(),
        4 => "quad".to_string(),
        n => format!("{n}-motor"),
    }
}

fn unique_features(def: &AttributeDefinition, winner: Side<'_>, loser: Side<'_>, limit: usize) -> Option<String> {
    let mine = resolve(winner.specs, &def.key).map(string_list).unwrap_or_default();
    let theirs: BTreeSet<String> = resolve(loser.specs, &def.key)
        .map(string_list)
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.to_lowercase())
        .collect();

    let mut seen = BTreeSet::new();
    let unique: Vec<String> = mine
        .into_iter()
        .filter(|f| {
            let lower = f.to_lowercase();
            !theirs.contains(&lower) && seen.insert(lower)
        })
        .collect();
    if unique.is_empty() {
        return None;
    }

    let shown = unique.iter().take(limit).cloned().collect::<Vec<_>>().join(", ");
    let extra = unique.len().saturating_sub(limit);
    if extra > 0 {
        Some(format!("Adds {shown} (+{extra} more)"))
    } else {
        Some(format!("Adds {shown}"))
    }
}

/// Headline and comparison line for a decided attribute.
fn phrase(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    winner: Side<'_>,
    loser: Side<'_>,
    diff: Option<f64>,
    shown: (&Option<String>, &Option<String>),
) -> Option<(String, Option<String>)> {
    let (w, l) = shown;
    let amount = diff.map(|d| with_unit(&format_number(d), &def.unit));

    let out = match def.diff_format {
        DiffFormat::Faster
        | DiffFormat::More
        | DiffFormat::Higher
        | DiffFormat::Larger
        | DiffFormat::Longer
        | DiffFormat::Shorter
        | DiffFormat::Lower => {
            let word = match def.diff_format {
                DiffFormat::Faster => "faster",
                DiffFormat::More => "more",
                DiffFormat::Higher => "higher",
                DiffFormat::Larger => "larger",
                DiffFormat::Longer => "longer",
                DiffFormat::Shorter => "shorter",
                _ => "lower",
            };
            let headline = match amount {
                Some(a) => format!("{a} {word} {}", def.label),
                None => label_or_default(def, "Better"),
            };
            (headline, versus(w, l))
        }
        DiffFormat::Lighter => {
            let headline = match amount {
                Some(a) => format!("{a} lighter"),
                None => label_or_default(def, "Lighter"),
            };
            (headline, versus(w, l))
        }
        DiffFormat::WaterResistance => (label_or_default(def, "Better"), versus(w, l)),
        DiffFormat::Better => match (category(winner), category(loser)) {
            (Some(wc), lc) => {
                let loser_word = match lc.as_deref() {
                    Some("none") | None => "no".to_string(),
                    Some(other) => other.to_string(),
                };
                let headline = format!("{} vs {loser_word} {}", capitalize(&wc), def.label);
                let comparison = def.display.as_ref().and(versus(w, l));
                (headline, comparison)
            }
            (None, _) => (label_or_default(def, "Better"), versus(w, l)),
        },
        DiffFormat::SaferTires => {
            let wc = category(winner)?;
            let lc = category(loser).unwrap_or_else(|| "no".to_string());
            let headline = format!("{} vs {lc} tires", capitalize(&wc));
            (headline, def.display.as_ref().and(versus(w, l)))
        }
        DiffFormat::LargerTires => (
            def.headline.clone().unwrap_or_else(|| "Larger tires".to_string()),
            versus(w, l),
        ),
        DiffFormat::HasFeature => (
            label_or_default(def, "Has"),
            Some("yes vs no".to_string()),
        ),
        DiffFormat::FoldableBars => (
            def.headline
                .clone()
                .unwrap_or_else(|| "Foldable handlebars".to_string()),
            Some("yes vs no".to_string()),
        ),
        DiffFormat::DualVsSingle => {
            let wn = winner.value?.as_number()?.round() as i64;
            let ln = loser.value.and_then(Normalized::as_number).unwrap_or(1.0).round() as i64;
            if wn == ln {
                return None;
            }
            let headline = format!(
                "{} motor vs {} motor",
                capitalize(&motor_word(wn)),
                motor_word(ln)
            );
            (headline, None)
        }
        DiffFormat::FeatureCount => {
            let gap = diff?.round() as usize;
            if gap < settings.feature_count_min_diff {
                return None;
            }
            let headline = format!("{gap} more features");
            let comparison = unique_features(def, winner, loser, settings.feature_list_limit);
            (headline, comparison)
        }
    };
    Some(out)
}

/// Build the advantage for a decided attribute, or `None` when it cannot be
/// phrased.
pub fn format_advantage(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    winner_index: usize,
    winner: Side<'_>,
    loser: Side<'_>,
    diff: Option<f64>,
) -> Option<Advantage> {
    let w = display_value(def, winner);
    let l = display_value(def, loser);
    let (headline, comparison) = phrase(def, settings, winner, loser, diff, (&w, &l))?;
    if headline.trim().is_empty() {
        return None;
    }

    Some(Advantage {
        winner_index,
        headline,
        comparison,
        spec_key: def.key.clone(),
        winner_value: w.unwrap_or_else(|| MISSING.to_string()),
        loser_value: l.unwrap_or_else(|| MISSING.to_string()),
        diff,
        tooltip: def.tooltip.clone(),
    })
}

/// Short phrase for a child advantage folded into a composite headline.
pub fn fragment(def: &AttributeDefinition, adv: &Advantage) -> String {
    let numeric = matches!(def.mode, ComparisonMode::Numeric(_));
    match (def.diff_format, &adv.comparison) {
        (DiffFormat::LargerTires, Some(c)) => format!("larger {c}"),
        (DiffFormat::Better | DiffFormat::WaterResistance, Some(c)) if numeric => {
            format!("{} ({c})", lowercase_first(&adv.headline))
        }
        _ => lowercase_first(&adv.headline),
    }
}
