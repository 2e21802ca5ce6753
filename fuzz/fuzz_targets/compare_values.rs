//! Comparator and advantage formatter over arbitrary normalized values.
//!
//! Any pair of values, direction, format and threshold must produce a verdict
//! (and, for a winner, an optional advantage) without panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use specvs_domain::{AttributeDefinition, Side, Verdict, compare, format_advantage};
use specvs_types::{DiffFormat, Direction, EngineSettings, Normalized, SpecMap};

#[derive(Arbitrary, Debug)]
struct Input {
    a: Option<Normalized>,
    b: Option<Normalized>,
    direction: Direction,
    format: DiffFormat,
    min_diff: Option<f64>,
    percentage_threshold: f64,
    require_valid_pair: bool,
    presence_wins: bool,
    ranking: Option<Vec<String>>,
}

fuzz_target!(|input: Input| {
    let mut def = match &input.ranking {
        Some(r) if !r.is_empty() => AttributeDefinition::ranked("x", "x", r.as_slice()),
        _ => AttributeDefinition::numeric("x", "x", input.direction),
    }
    .unit("mph")
    .format(input.format);
    if let Some(m) = input.min_diff.filter(|m| m.is_finite() && *m >= 0.0) {
        def = def.min_diff(m);
    }
    if input.require_valid_pair {
        def = def.require_valid_pair();
    }
    if input.presence_wins {
        def = def.presence_wins();
    }

    let settings = EngineSettings {
        percentage_threshold: input.percentage_threshold,
        ..EngineSettings::default()
    };

    let verdict = compare(&def, &settings, input.a.as_ref(), input.b.as_ref());
    if let Verdict::Winner { index, diff } = verdict {
        let empty = SpecMap::new();
        let values = [input.a.as_ref(), input.b.as_ref()];
        let winner = Side { specs: &empty, value: values[index] };
        let loser = Side { specs: &empty, value: values[1 - index] };
        let _ = format_advantage(&def, &settings, index, winner, loser, diff);
    }
});
