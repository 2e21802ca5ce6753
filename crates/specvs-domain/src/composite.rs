//! Composite categories: one consolidated advantage in place of several
//! child attributes, when the category is decisively won.

use crate::format::fragment;
use crate::pairwise::evaluate;
use crate::registry::{AttributeDefinition, CompositeDefinition, Registry};
use specvs_normalize::{format_number, path::as_f64, resolve};
use specvs_types::{Advantage, CompositeFormat, CompositeOutcome, SpecMap};
use std::collections::BTreeMap;
use tracing::debug;

/// What a composite contributes to a pairwise run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeStep {
    pub outcome: CompositeOutcome,

    /// Advantages to append, in order.
    pub emitted: Vec<Advantage>,

    /// Children the category loser won on its own, keyed to the loser's index.
    /// They are itemized for that product only, at their own priority.
    pub deferred: BTreeMap<String, usize>,
}

pub fn evaluate_composite(
    registry: &Registry,
    def: &AttributeDefinition,
    composite: &CompositeDefinition,
    specs: [&SpecMap; 2],
) -> CompositeStep {
    match composite.format {
        CompositeFormat::Consolidated => consolidate(registry, def, composite, specs),
        CompositeFormat::Portability => portability(registry, def, composite, specs),
    }
}

fn category_scores(composite: &CompositeDefinition, specs: [&SpecMap; 2]) -> Option<(f64, f64)> {
    let key = composite.score_key.as_deref()?;
    let a = resolve(specs[0], key).and_then(as_f64)?;
    let b = resolve(specs[1], key).and_then(as_f64)?;
    Some((a, b))
}

/// Score-gated roll-up.
///
/// A gap below `score_diff_threshold` is close: nothing is consolidated and
/// every child is left for standalone evaluation. Otherwise the children the
/// category winner also wins are joined into one phrase; children the loser
/// wins are deferred to the loser, and children nobody wins are consumed.
pub fn consolidate(
    registry: &Registry,
    def: &AttributeDefinition,
    composite: &CompositeDefinition,
    specs: [&SpecMap; 2],
) -> CompositeStep {
    let mut step = CompositeStep::default();

    let Some((a, b)) = category_scores(composite, specs) else {
        debug!(composite = %def.key, "category score missing; children stand alone");
        return step;
    };
    let gap = (a - b).abs();
    if gap < composite.score_diff_threshold || a == b {
        debug!(composite = %def.key, gap, "category scores are close");
        step.outcome.is_close = true;
        return step;
    }

    let winner = if a > b { 0 } else { 1 };
    step.outcome.winner_index = Some(winner);

    let settings = registry.settings();
    let max_items = composite.max_items.unwrap_or(settings.composite_max_items);
    let mut fragments = Vec::new();
    for child in &composite.children {
        let Some(child_def) = registry.get(child) else {
            continue;
        };
        match evaluate(child_def, settings, specs) {
            Ok(adv) if adv.winner_index == winner => {
                if fragments.len() < max_items {
                    fragments.push(fragment(child_def, &adv));
                }
                step.outcome.children_handled.insert(child.clone());
            }
            Ok(adv) => {
                step.deferred.insert(child.clone(), adv.winner_index);
            }
            Err(_) => {
                step.outcome.children_handled.insert(child.clone());
            }
        }
    }

    if fragments.is_empty() {
        debug!(composite = %def.key, "category winner wins no child; children stand alone");
        step.outcome.children_handled.clear();
        step.deferred.clear();
        return step;
    }

    let (winner_score, loser_score) = if winner == 0 { (a, b) } else { (b, a) };
    let advantage = Advantage {
        winner_index: winner,
        headline: def
            .headline
            .clone()
            .unwrap_or_else(|| format!("Better {}", def.label)),
        comparison: Some(fragments.join(", ")),
        spec_key: def.key.clone(),
        winner_value: format_number(winner_score),
        loser_value: format_number(loser_score),
        diff: Some(gap),
        tooltip: def.tooltip.clone(),
    };
    step.outcome.consolidated = Some(advantage.clone());
    step.emitted.push(advantage);
    step
}

/// Two-factor composite decided by its children directly.
///
/// Same winner on both factors gives one consolidated advantage. A split
/// gives one single-factor advantage to each side and marks the pair close.
/// With fewer than two decided factors the children stand alone.
pub fn portability(
    registry: &Registry,
    def: &AttributeDefinition,
    composite: &CompositeDefinition,
    specs: [&SpecMap; 2],
) -> CompositeStep {
    let mut step = CompositeStep::default();
    let settings = registry.settings();

    let mut decided = Vec::with_capacity(2);
    for child in &composite.children {
        let Some(child_def) = registry.get(child) else {
            return step;
        };
        match evaluate(child_def, settings, specs) {
            Ok(adv) => decided.push((child_def, adv)),
            Err(reason) => {
                debug!(composite = %def.key, child = %child, ?reason, "factor undecided; children stand alone");
                return step;
            }
        }
    }
    let Ok([(first_def, first), (second_def, second)]) = <[_; 2]>::try_from(decided) else {
        return step;
    };

    step.outcome
        .children_handled
        .extend([first_def.key.clone(), second_def.key.clone()]);

    if first.winner_index == second.winner_index {
        let winner = first.winner_index;
        step.outcome.winner_index = Some(winner);
        let advantage = Advantage {
            winner_index: winner,
            headline: def
                .headline
                .clone()
                .unwrap_or_else(|| "More portable".to_string()),
            comparison: Some(format!(
                "{}, {}",
                fragment(first_def, &first),
                fragment(second_def, &second)
            )),
            spec_key: def.key.clone(),
            winner_value: format!("{}, {}", first.winner_value, second.winner_value),
            loser_value: format!("{}, {}", first.loser_value, second.loser_value),
            diff: None,
            tooltip: def.tooltip.clone(),
        };
        step.outcome.consolidated = Some(advantage.clone());
        step.emitted.push(advantage);
    } else {
        step.outcome.is_close = true;
        step.emitted.push(first);
        step.emitted.push(second);
    }
    step
}
