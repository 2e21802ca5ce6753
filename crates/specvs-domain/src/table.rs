//! N-product comparison table with per-row winner badges.

use crate::compare::{higher_wins, is_valid, normalize, score, significant};
use crate::format::{Side, display_value, with_unit};
use crate::registry::{AttributeDefinition, ComparisonMode, Registry};
use specvs_normalize::{display::scalar, resolve};
use specvs_types::{EngineSettings, Product, TABLE_SCHEMA_V1, TableCell, TableReport, TableRow};
use std::collections::BTreeSet;

const NOT_AVAILABLE: &str = "N/A";

/// Winner set for one attribute across any number of products.
///
/// Every product matching the best score wins, provided the best score clears
/// the same significance bar the pairwise comparison applies against every
/// other comparable value. When all comparable products share the best score
/// there is no signal and the set is empty. A lone comparable value only wins
/// for attributes where presence itself is an advantage.
pub fn winners(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    products: &[&Product],
) -> BTreeSet<usize> {
    let comparable: Vec<(usize, f64)> = products
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            normalize(def, &p.specs)
                .and_then(|v| score(def, &v))
                .filter(|s| is_valid(def, *s))
                .map(|s| (i, s))
        })
        .collect();

    match comparable.as_slice() {
        [] => return BTreeSet::new(),
        [(i, _)] if def.presence_wins && present_count(def, products) == 1 => {
            return BTreeSet::from([*i]);
        }
        [_] => return BTreeSet::new(),
        _ => {}
    }

    let higher = higher_wins(def);
    let best = comparable
        .iter()
        .map(|&(_, s)| s)
        .fold(None, |acc: Option<f64>, s| match acc {
            None => Some(s),
            Some(b) if (higher && s > b) || (!higher && s < b) => Some(s),
            keep => keep,
        });
    let Some(best) = best else {
        return BTreeSet::new();
    };

    if comparable.iter().all(|&(_, s)| s == best) {
        return BTreeSet::new();
    }
    if matches!(def.mode, ComparisonMode::Numeric(_))
        && comparable
            .iter()
            .filter(|&&(_, s)| s != best)
            .any(|&(_, s)| !significant(def, settings, best, s, (best - s).abs(), higher))
    {
        return BTreeSet::new();
    }
    comparable
        .into_iter()
        .filter(|&(_, s)| s == best)
        .map(|(i, _)| i)
        .collect()
}

/// Products with any value at all, valid or not. A present but invalid value
/// (an unrated IP code) blocks a presence win just as it does pairwise.
fn present_count(def: &AttributeDefinition, products: &[&Product]) -> usize {
    products
        .iter()
        .filter(|p| normalize(def, &p.specs).is_some())
        .count()
}

/// Display formatter first, then the raw value, then the derived value of a
/// document normalizer (e.g. a footprint with no raw field of its own).
fn cell_text(def: &AttributeDefinition, product: &Product) -> String {
    if let Some(text) = def
        .display
        .as_ref()
        .and_then(|d| d.render(&product.specs, &def.key))
    {
        return text;
    }
    if let Some(raw) = resolve(&product.specs, &def.key).and_then(scalar) {
        return with_unit(&raw, &def.unit);
    }
    if def.normalizer.is_some_and(|n| n.uses_full_document()) {
        let value = normalize(def, &product.specs);
        let side = Side {
            specs: &product.specs,
            value: value.as_ref(),
        };
        if let Some(text) = display_value(def, side) {
            return text;
        }
    }
    NOT_AVAILABLE.to_string()
}

pub fn build_row(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    products: &[&Product],
) -> TableRow {
    let winners = winners(def, settings, products);
    let cells = products
        .iter()
        .enumerate()
        .map(|(i, p)| TableCell {
            display: cell_text(def, p),
            winner: winners.contains(&i),
        })
        .collect();
    TableRow {
        key: def.key.clone(),
        label: def.label.clone(),
        unit: def.unit.clone(),
        cells,
        winners,
    }
}

/// One row per non-composite attribute, in registry order.
pub fn build_table(registry: &Registry, products: &[Product]) -> TableReport {
    let refs: Vec<&Product> = products.iter().collect();
    let rows = registry
        .iter()
        .filter(|def| !def.is_composite())
        .map(|def| build_row(def, registry.settings(), &refs))
        .collect();
    TableReport {
        schema: TABLE_SCHEMA_V1.to_string(),
        products: products.iter().map(Product::to_ref).collect(),
        rows,
    }
}
