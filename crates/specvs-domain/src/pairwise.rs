//! Two-product orchestration: walk the registry in order and collect
//! advantages for each side.

use crate::compare::{Verdict, compare, normalize};
use crate::composite::{CompositeStep, evaluate_composite};
use crate::format::{Side, format_advantage};
use crate::registry::{AttributeDefinition, Registry};
use specvs_types::{
    Advantage, CompositeOutcome, EngineSettings, PAIRWISE_SCHEMA_V1, PairwiseReport, Product,
    SkipReason, SpecMap,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Evaluate one attribute on its own: normalize, compare, phrase.
pub fn evaluate(
    def: &AttributeDefinition,
    settings: &EngineSettings,
    specs: [&SpecMap; 2],
) -> Result<Advantage, SkipReason> {
    let values = [normalize(def, specs[0]), normalize(def, specs[1])];
    match compare(def, settings, values[0].as_ref(), values[1].as_ref()) {
        Verdict::NoWinner(reason) => Err(reason),
        Verdict::Winner { index, diff } => {
            let loser = 1 - index;
            let winner_side = Side {
                specs: specs[index],
                value: values[index].as_ref(),
            };
            let loser_side = Side {
                specs: specs[loser],
                value: values[loser].as_ref(),
            };
            format_advantage(def, settings, index, winner_side, loser_side, diff)
                .ok_or(SkipReason::Unformattable)
        }
    }
}

/// Per-call accumulator. Owned by one `compare_pair` call and dropped with it.
struct PairwiseContext<'a> {
    registry: &'a Registry,
    specs: [&'a SpecMap; 2],
    cap: usize,
    advantages: [Vec<Advantage>; 2],

    /// Keys evaluated with data, for `fallback_for` suppression.
    processed: BTreeSet<String>,

    /// Keys consumed by a composite. Only grows.
    handled: BTreeSet<String>,

    /// Composite children the category loser may still itemize.
    deferred: BTreeMap<String, usize>,

    composites: BTreeMap<String, CompositeOutcome>,
    skipped: BTreeMap<String, SkipReason>,
}

impl<'a> PairwiseContext<'a> {
    fn new(registry: &'a Registry, specs: [&'a SpecMap; 2]) -> Self {
        Self {
            registry,
            specs,
            cap: registry.settings().max_advantages_per_product,
            advantages: [Vec::new(), Vec::new()],
            processed: BTreeSet::new(),
            handled: BTreeSet::new(),
            deferred: BTreeMap::new(),
            composites: BTreeMap::new(),
            skipped: BTreeMap::new(),
        }
    }

    fn full(&self) -> bool {
        self.advantages.iter().all(|list| list.len() >= self.cap)
    }

    fn skip(&mut self, key: &str, reason: SkipReason) {
        debug!(key, ?reason, "attribute skipped");
        self.skipped.insert(key.to_string(), reason);
    }

    fn push(&mut self, advantage: Advantage) {
        let index = advantage.winner_index;
        if self.advantages[index].len() >= self.cap {
            self.skip(&advantage.spec_key, SkipReason::CapReached);
            return;
        }
        trace!(key = %advantage.spec_key, winner = index, headline = %advantage.headline, "advantage");
        self.advantages[index].push(advantage);
    }

    fn step(&mut self, def: &AttributeDefinition) {
        if self.handled.contains(&def.key) {
            self.processed.insert(def.key.clone());
            self.skip(&def.key, SkipReason::Handled);
            return;
        }

        if let Some(target) = &def.fallback_for {
            if self.processed.contains(target) {
                self.skip(&def.key, SkipReason::FallbackSuppressed);
                return;
            }
        }

        if let Some(composite) = &def.composite {
            let step = evaluate_composite(self.registry, def, composite, self.specs);
            self.absorb(&def.key, step);
            return;
        }

        let result = evaluate(def, self.registry.settings(), self.specs);
        if !matches!(result, Err(SkipReason::MissingData)) {
            self.processed.insert(def.key.clone());
        }

        match (self.deferred.get(&def.key).copied(), result) {
            (Some(loser), Ok(adv)) if adv.winner_index == loser => self.push(adv),
            (Some(_), _) => self.skip(&def.key, SkipReason::Handled),
            (None, Ok(adv)) => self.push(adv),
            (None, Err(reason)) => self.skip(&def.key, reason),
        }
    }

    fn absorb(&mut self, key: &str, step: CompositeStep) {
        let CompositeStep {
            outcome,
            emitted,
            deferred,
        } = step;

        self.handled.extend(outcome.children_handled.iter().cloned());
        self.deferred.extend(deferred);
        if emitted.is_empty() {
            let reason = if outcome.is_close {
                SkipReason::BelowThreshold
            } else {
                SkipReason::MissingData
            };
            self.skip(key, reason);
        } else {
            self.processed.insert(key.to_string());
        }
        for advantage in emitted {
            self.push(advantage);
        }
        self.composites.insert(key.to_string(), outcome);
    }
}

/// Head-to-head comparison of two products.
///
/// Never fails: attributes without usable data are skipped and recorded in
/// `skipped` with the reason.
pub fn compare_pair(registry: &Registry, a: &Product, b: &Product) -> PairwiseReport {
    let mut ctx = PairwiseContext::new(registry, [&a.specs, &b.specs]);

    for def in registry.iter() {
        if ctx.full() {
            debug!(cap = ctx.cap, "both products reached the advantage cap");
            break;
        }
        ctx.step(def);
    }

    PairwiseReport {
        schema: PAIRWISE_SCHEMA_V1.to_string(),
        products: [a.to_ref(), b.to_ref()],
        advantages: ctx.advantages,
        composites: ctx.composites,
        skipped: ctx.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CompositeDefinition;
    use proptest::prelude::*;
    use serde_json::{Value, json};
    use specvs_types::{CompositeFormat, DiffFormat, Direction};

    fn product(id: &str, specs: Value) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            category: "escooter".to_string(),
            specs: specs.as_object().cloned().unwrap_or_default(),
        }
    }

    fn ride_registry(threshold: f64) -> Registry {
        let suspension = AttributeDefinition::ranked(
            "suspension.type",
            "suspension",
            &["none", "spring", "hydraulic"],
        )
        .priority(11);
        let tires = AttributeDefinition::numeric("wheels.tire_size", "tire size", Direction::Higher)
            .unit("\"")
            .format(DiffFormat::LargerTires)
            .min_diff(1.0)
            .priority(12);
        let brakes = AttributeDefinition::ranked("brakes.type", "brakes", &["foot", "drum", "disc"])
            .priority(13);
        let ride = AttributeDefinition::composite(
            "ride_quality",
            "ride quality",
            CompositeDefinition {
                children: vec![
                    "suspension.type".into(),
                    "wheels.tire_size".into(),
                    "brakes.type".into(),
                ],
                score_key: Some("scores.ride_quality".into()),
                score_diff_threshold: threshold,
                format: CompositeFormat::Consolidated,
                max_items: None,
            },
        )
        .priority(10);
        Registry::new(EngineSettings::default(), vec![ride, suspension, tires, brakes]).unwrap()
    }

    #[test]
    fn top_speed_advantage() {
        let def = AttributeDefinition::numeric("performance.top_speed", "top speed", Direction::Higher)
            .unit("mph")
            .format(DiffFormat::Faster);
        let registry = Registry::new(EngineSettings::default(), vec![def]).unwrap();
        let a = product("a", json!({ "performance": { "top_speed": 25.0 } }));
        let b = product("b", json!({ "performance": { "top_speed": 20.0 } }));

        let report = compare_pair(&registry, &a, &b);
        assert_eq!(report.schema, PAIRWISE_SCHEMA_V1);
        assert_eq!(report.advantages[0].len(), 1);
        assert!(report.advantages[1].is_empty());
        let adv = &report.advantages[0][0];
        assert_eq!(adv.headline, "5 mph faster top speed");
        assert_eq!(adv.comparison.as_deref(), Some("25 mph vs 20 mph"));
    }

    #[test]
    fn insignificant_weight_gap_is_skipped() {
        let def = AttributeDefinition::numeric("dimensions.weight", "weight", Direction::Lower)
            .unit("lbs")
            .format(DiffFormat::Lighter);
        let registry = Registry::new(EngineSettings::default(), vec![def]).unwrap();
        let a = product("a", json!({ "dimensions.weight": 40.0 }));
        let b = product("b", json!({ "dimensions.weight": 41.0 }));

        let report = compare_pair(&registry, &a, &b);
        assert!(report.advantages.iter().all(Vec::is_empty));
        assert_eq!(
            report.skipped.get("dimensions.weight"),
            Some(&SkipReason::BelowThreshold)
        );
    }

    #[test]
    fn close_ride_quality_itemizes_children() {
        let registry = ride_registry(5.0);
        let a = product(
            "a",
            json!({
                "scores": { "ride_quality": 62 },
                "suspension": { "type": "hydraulic" },
                "wheels": { "tire_size": 8.5 },
            }),
        );
        let b = product(
            "b",
            json!({
                "scores": { "ride_quality": 65 },
                "suspension": { "type": "none" },
                "wheels": { "tire_size": 10.5 },
            }),
        );

        let report = compare_pair(&registry, &a, &b);
        let outcome = &report.composites["ride_quality"];
        assert!(outcome.is_close);
        assert_eq!(outcome.winner_index, None);
        assert!(outcome.consolidated.is_none());
        assert!(
            report
                .advantages
                .iter()
                .flatten()
                .all(|adv| adv.headline != "Better ride quality")
        );

        assert_eq!(report.advantages[0][0].headline, "Hydraulic vs no suspension");
        assert_eq!(report.advantages[1][0].headline, "Larger tires");
    }

    #[test]
    fn decisive_ride_quality_consolidates_and_leaves_loser_its_win() {
        let registry = ride_registry(5.0);
        let a = product(
            "a",
            json!({
                "scores": { "ride_quality": 80 },
                "suspension": { "type": "hydraulic" },
                "wheels": { "tire_size": 10.5 },
                "brakes": { "type": "foot" },
            }),
        );
        let b = product(
            "b",
            json!({
                "scores": { "ride_quality": 60 },
                "suspension": { "type": "none" },
                "wheels": { "tire_size": 8.5 },
                "brakes": { "type": "disc" },
            }),
        );

        let report = compare_pair(&registry, &a, &b);
        let outcome = &report.composites["ride_quality"];
        assert_eq!(outcome.winner_index, Some(0));
        assert!(!outcome.is_close);

        let consolidated = &report.advantages[0][0];
        assert_eq!(consolidated.headline, "Better ride quality");
        assert_eq!(consolidated.spec_key, "ride_quality");
        assert_eq!(
            consolidated.comparison.as_deref(),
            Some("hydraulic vs no suspension, larger 10.5\" vs 8.5\"")
        );
        assert_eq!(report.advantages[0].len(), 1);

        // The loser's own win is itemized for the loser only.
        assert_eq!(report.advantages[1].len(), 1);
        assert_eq!(report.advantages[1][0].spec_key, "brakes.type");

        assert_eq!(report.skipped.get("suspension.type"), Some(&SkipReason::Handled));
        assert_eq!(report.skipped.get("wheels.tire_size"), Some(&SkipReason::Handled));
    }

    #[test]
    fn missing_category_score_leaves_children_standalone() {
        let registry = ride_registry(5.0);
        let a = product("a", json!({ "suspension": { "type": "spring" } }));
        let b = product("b", json!({ "suspension": { "type": "none" } }));

        let report = compare_pair(&registry, &a, &b);
        assert!(!report.composites["ride_quality"].is_close);
        assert_eq!(report.advantages[0][0].spec_key, "suspension.type");
    }

    fn portability_registry() -> Registry {
        let weight = AttributeDefinition::numeric("dimensions.weight", "weight", Direction::Lower)
            .unit("lbs")
            .format(DiffFormat::Lighter)
            .priority(21);
        let footprint = AttributeDefinition::numeric(
            "dimensions.folded_footprint",
            "folded footprint",
            Direction::Lower,
        )
        .headline("Smaller folded footprint")
        .normalizer(specvs_normalize::lookup("folded_footprint").unwrap())
        .display(specvs_normalize::display::lookup("footprint").unwrap())
        .priority(22);
        let portability = AttributeDefinition::composite(
            "portability",
            "portability",
            CompositeDefinition {
                children: vec!["dimensions.weight".into(), "dimensions.folded_footprint".into()],
                score_key: None,
                score_diff_threshold: 0.0,
                format: CompositeFormat::Portability,
                max_items: None,
            },
        )
        .priority(20);
        Registry::new(EngineSettings::default(), vec![portability, weight, footprint]).unwrap()
    }

    #[test]
    fn portability_sweep_is_one_advantage() {
        let registry = portability_registry();
        let a = product(
            "a",
            json!({ "dimensions": { "weight": 30, "folded_length": 40, "folded_width": 15 } }),
        );
        let b = product(
            "b",
            json!({ "dimensions": { "weight": 45, "folded_length": 45, "folded_width": 20 } }),
        );

        let report = compare_pair(&registry, &a, &b);
        assert_eq!(report.advantages[0].len(), 1);
        let adv = &report.advantages[0][0];
        assert_eq!(adv.headline, "More portable");
        assert_eq!(
            adv.comparison.as_deref(),
            Some("15 lbs lighter, smaller folded footprint (40 x 15 vs 45 x 20)")
        );
        assert!(report.advantages[1].is_empty());
    }

    #[test]
    fn portability_split_itemizes_each_factor() {
        let registry = portability_registry();
        let a = product(
            "a",
            json!({ "dimensions": { "weight": 30, "folded_length": 50, "folded_width": 20 } }),
        );
        let b = product(
            "b",
            json!({ "dimensions": { "weight": 45, "folded_length": 40, "folded_width": 15 } }),
        );

        let report = compare_pair(&registry, &a, &b);
        assert!(report.composites["portability"].is_close);
        assert_eq!(report.advantages[0][0].spec_key, "dimensions.weight");
        assert_eq!(report.advantages[1][0].spec_key, "dimensions.folded_footprint");
        assert_eq!(report.advantages[0].len() + report.advantages[1].len(), 2);
    }

    #[test]
    fn fallback_is_suppressed_once_preferred_key_was_evaluated() {
        let tested = AttributeDefinition::numeric("tested_top_speed", "top speed", Direction::Higher)
            .unit("mph")
            .format(DiffFormat::Faster)
            .priority(1);
        let claimed = AttributeDefinition::numeric("manufacturer_top_speed", "top speed", Direction::Higher)
            .unit("mph")
            .format(DiffFormat::Faster)
            .fallback_for("tested_top_speed")
            .priority(2);
        let registry = Registry::new(EngineSettings::default(), vec![tested, claimed]).unwrap();

        let a = product("a", json!({ "tested_top_speed": 24, "manufacturer_top_speed": 28 }));
        let b = product("b", json!({ "tested_top_speed": 20, "manufacturer_top_speed": 20 }));
        let report = compare_pair(&registry, &a, &b);
        assert_eq!(report.advantages[0].len(), 1);
        assert_eq!(report.advantages[0][0].spec_key, "tested_top_speed");
        assert_eq!(
            report.skipped.get("manufacturer_top_speed"),
            Some(&SkipReason::FallbackSuppressed)
        );

        let a = product("a", json!({ "manufacturer_top_speed": 28 }));
        let b = product("b", json!({ "manufacturer_top_speed": 20 }));
        let report = compare_pair(&registry, &a, &b);
        assert_eq!(report.advantages[0][0].spec_key, "manufacturer_top_speed");
    }

    #[test]
    fn no_data_means_no_advantages() {
        let registry = ride_registry(5.0);
        let report = compare_pair(&registry, &product("a", json!({})), &product("b", json!({})));
        assert!(report.advantages.iter().all(Vec::is_empty));
    }

    // =========================================================================
    // Property-Based Tests
    // =========================================================================

    fn many_numeric(cap: usize) -> Registry {
        let defs = (0..12)
            .map(|i| {
                let dir = if i % 2 == 0 { Direction::Higher } else { Direction::Lower };
                AttributeDefinition::numeric(&format!("m{i:02}"), &format!("metric {i}"), dir)
                    .format(DiffFormat::More)
                    .priority(i)
            })
            .collect();
        let settings = EngineSettings {
            max_advantages_per_product: cap,
            ..EngineSettings::default()
        };
        Registry::new(settings, defs).unwrap()
    }

    fn arb_specs() -> impl Strategy<Value = Value> {
        proptest::collection::vec(
            prop_oneof![Just(Value::Null), (0.0f64..100.0).prop_map(|v| json!(v))],
            12,
        )
        .prop_map(|values| {
            Value::Object(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("m{i:02}"), v))
                    .collect(),
            )
        })
    }

    proptest! {
        /// Property: per-product advantage count never exceeds the cap.
        #[test]
        fn prop_cap_respected(cap in 0usize..5, a in arb_specs(), b in arb_specs()) {
            let registry = many_numeric(cap);
            let report = compare_pair(&registry, &product("a", a), &product("b", b));
            for list in &report.advantages {
                prop_assert!(list.len() <= cap);
            }
        }

        /// Property: identical inputs give identical, identically ordered output.
        #[test]
        fn prop_deterministic(a in arb_specs(), b in arb_specs()) {
            let registry = many_numeric(6);
            let (pa, pb) = (product("a", a), product("b", b));
            prop_assert_eq!(compare_pair(&registry, &pa, &pb), compare_pair(&registry, &pa, &pb));
        }

        /// Property: a spec key is the subject of at most one advantage.
        #[test]
        fn prop_no_double_counting(
            ra in 0.0f64..100.0, rb in 0.0f64..100.0,
            sa in 0usize..3, sb in 0usize..3,
            ta in 6.0f64..12.0, tb in 6.0f64..12.0,
            fa in 0usize..3, fb in 0usize..3,
        ) {
            let kinds = ["none", "spring", "hydraulic"];
            let brakes = ["foot", "drum", "disc"];
            let a = product("a", json!({
                "scores": { "ride_quality": ra },
                "suspension": { "type": kinds[sa] },
                "wheels": { "tire_size": ta },
                "brakes": { "type": brakes[fa] },
            }));
            let b = product("b", json!({
                "scores": { "ride_quality": rb },
                "suspension": { "type": kinds[sb] },
                "wheels": { "tire_size": tb },
                "brakes": { "type": brakes[fb] },
            }));
            let report = compare_pair(&ride_registry(5.0), &a, &b);

            let mut seen = BTreeSet::new();
            for adv in report.advantages.iter().flatten() {
                prop_assert!(seen.insert(adv.spec_key.clone()), "duplicate {}", adv.spec_key);
            }
            if report.composites["ride_quality"].consolidated.is_some() {
                let handled = &report.composites["ride_quality"].children_handled;
                for key in handled {
                    prop_assert!(!seen.contains(key));
                }
            }
        }

        /// Property: a close composite leaves its children exactly as standalone
        /// attributes would be evaluated.
        #[test]
        fn prop_close_composite_is_transparent(
            gap in 0.0f64..4.99,
            sa in 0usize..3, sb in 0usize..3,
            ta in 6.0f64..12.0, tb in 6.0f64..12.0,
        ) {
            let kinds = ["none", "spring", "hydraulic"];
            let specs = |score: f64, s: usize, t: f64| json!({
                "scores": { "ride_quality": score },
                "suspension": { "type": kinds[s] },
                "wheels": { "tire_size": t },
            });
            let a = product("a", specs(60.0 + gap, sa, ta));
            let b = product("b", specs(60.0, sb, tb));

            let with_composite = compare_pair(&ride_registry(5.0), &a, &b);
            prop_assert!(with_composite.composites["ride_quality"].consolidated.is_none());

            let standalone: Vec<AttributeDefinition> = ride_registry(5.0)
                .iter()
                .filter(|d| !d.is_composite())
                .cloned()
                .collect();
            let plain = Registry::new(EngineSettings::default(), standalone).unwrap();
            let without = compare_pair(&plain, &a, &b);
            prop_assert_eq!(with_composite.advantages, without.advantages);
        }
    }
}
